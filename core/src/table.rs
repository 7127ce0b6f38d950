//! Table definitions and `CREATE TABLE` generation.
//!
//! A [`TableSpec`] is either a structured [`TableDefinition`] or a raw SQL
//! script. Structured definitions render to a canonical statement:
//!
//! ```text
//! CREATE TABLE Users (
//!     Id INTEGER NOT NULL,
//!     Name NVARCHAR(50),
//!     PRIMARY KEY (Id)
//! )
//! ```
//!
//! # JSON form
//!
//! ```json
//! {
//!   "name": "Users",
//!   "columns": [
//!     { "name": "Id", "type": "integer", "primary_key": true },
//!     { "name": "Name", "type": "unicode", "length": 50 }
//!   ]
//! }
//! ```
//!
//! A JSON string instead of an object is taken as a script.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatementError};

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInteger,
    Float,
    Boolean,
    /// Variable-length byte string, `VARCHAR(length)`.
    String,
    /// Variable-length Unicode string, `NVARCHAR(length)`.
    Unicode,
    /// Unbounded text.
    Text,
    DateTime,
}

impl ColumnType {
    fn sql_name(self, length: Option<u32>) -> String {
        let base = match self {
            Self::Integer => "INTEGER",
            Self::BigInteger => "BIGINT",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::String => "VARCHAR",
            Self::Unicode => "NVARCHAR",
            Self::Text => "TEXT",
            Self::DateTime => "DATETIME",
        };
        match (self, length) {
            (Self::String | Self::Unicode, Some(n)) => format!("{base}({n})"),
            _ => base.to_string(),
        }
    }
}

fn default_nullable() -> bool {
    true
}

/// A single column of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Only meaningful for `String` and `Unicode`.
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDef {
    /// Creates a nullable, non-key column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: None,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as part of the primary key. Key columns are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            self.name,
            self.column_type.sql_name(self.length)
        );
        if !self.nullable || self.primary_key {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Structured description of a table.
///
/// # Examples
///
/// ```
/// use recordsql_core::{ColumnDef, ColumnType, TableDefinition, generate_create_table_sql};
///
/// let table = TableDefinition::new("Users")
///     .with_column(ColumnDef::new("Id", ColumnType::Integer).primary_key())
///     .with_column(ColumnDef::new("Name", ColumnType::Unicode).with_length(50));
/// let sql = generate_create_table_sql(&table).unwrap();
/// assert!(sql.starts_with("CREATE TABLE Users ("));
/// assert!(sql.contains("PRIMARY KEY (Id)"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }
}

/// Input accepted by table creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSpec {
    Definition(TableDefinition),
    /// Executed verbatim.
    Script(String),
}

impl TableSpec {
    /// Decodes a spec from JSON: an object is a definition, a string a script.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError::InvalidTableSpec`] for any other JSON shape
    /// or an object that does not describe a table.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::String(script) => Ok(Self::Script(script)),
            object @ serde_json::Value::Object(_) => serde_json::from_value(object)
                .map(Self::Definition)
                .map_err(|e| StatementError::InvalidTableSpec(e.to_string())),
            other => Err(StatementError::InvalidTableSpec(format!(
                "expected a table definition object or a SQL script string, got {other}"
            ))),
        }
    }

    /// Returns the SQL to execute for this spec.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError::InvalidTableSpec`] for a blank script or a
    /// definition [`generate_create_table_sql`] rejects.
    pub fn to_sql(&self) -> Result<String> {
        match self {
            Self::Definition(table) => generate_create_table_sql(table),
            Self::Script(script) if script.trim().is_empty() => Err(
                StatementError::InvalidTableSpec("SQL script is empty".to_string()),
            ),
            Self::Script(script) => Ok(script.clone()),
        }
    }
}

impl From<TableDefinition> for TableSpec {
    fn from(table: TableDefinition) -> Self {
        Self::Definition(table)
    }
}

impl From<String> for TableSpec {
    fn from(script: String) -> Self {
        Self::Script(script)
    }
}

impl From<&str> for TableSpec {
    fn from(script: &str) -> Self {
        Self::Script(script.to_string())
    }
}

/// Renders the `CREATE TABLE` statement for a definition.
///
/// # Errors
///
/// Returns [`StatementError::InvalidTableSpec`] if the table has no name or
/// no columns.
pub fn generate_create_table_sql(table: &TableDefinition) -> Result<String> {
    if table.name.trim().is_empty() {
        return Err(StatementError::InvalidTableSpec(
            "table name is empty".to_string(),
        ));
    }
    if table.columns.is_empty() {
        return Err(StatementError::InvalidTableSpec(format!(
            "table '{}' has no columns",
            table.name
        )));
    }

    let mut lines: Vec<String> = table.columns.iter().map(ColumnDef::to_sql).collect();
    let keys: Vec<&str> = table
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    if !keys.is_empty() {
        lines.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n)",
        table.name,
        lines.join(",\n    ")
    ))
}
