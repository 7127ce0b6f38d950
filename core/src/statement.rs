//! Parameterized CRUD statement building.
//!
//! Every builder returns a [`StatementText`]: SQL with `:name` placeholders
//! and the [`Record`] to bind against them. Values never appear in the SQL
//! text; table and field names are interpolated as-is.
//!
//! # Example
//!
//! ```
//! use recordsql_core::{Record, build_insert};
//!
//! let record = Record::new().with("Name", "O'Brien").with("Age", 30);
//! let stmt = build_insert("Users", &record).unwrap();
//! assert_eq!(stmt.sql, "INSERT INTO Users (Name, Age) VALUES (:Name, :Age)");
//! assert_eq!(stmt.params, record);
//! ```

use crate::error::{Result, StatementError};
use crate::record::Record;

/// SQL text plus its named bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementText {
    pub sql: String,
    /// Keyed by the placeholder names used in `sql`, without the leading `:`.
    pub params: Record,
}

/// Joins `key = :key` pairs with `separator`.
fn placeholder_pairs<'a>(keys: impl Iterator<Item = &'a str>, separator: &str) -> String {
    keys.map(|key| format!("{key} = :{key}"))
        .collect::<Vec<_>>()
        .join(separator)
}

pub(crate) fn require_fields(record: &Record, operation: &'static str, table: &str) -> Result<()> {
    if record.is_empty() {
        return Err(StatementError::EmptyRecord {
            operation,
            table: table.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_condition(
    condition: &Record,
    operation: &'static str,
    table: &str,
) -> Result<()> {
    if condition.is_empty() {
        return Err(StatementError::EmptyCondition {
            operation,
            table: table.to_string(),
        });
    }
    Ok(())
}

/// Builds `INSERT INTO table (k1, k2) VALUES (:k1, :k2)`.
///
/// # Errors
///
/// Returns [`StatementError::EmptyRecord`] if `record` has no fields.
pub fn build_insert(table: &str, record: &Record) -> Result<StatementText> {
    require_fields(record, "INSERT", table)?;
    let columns = record.keys().collect::<Vec<_>>().join(", ");
    let placeholders = record
        .keys()
        .map(|key| format!(":{key}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(StatementText {
        sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
        params: record.normalized(),
    })
}

/// Builds `UPDATE table SET k = :k, ... WHERE c = :c AND ...`.
///
/// Parameters are the record merged with the condition, record first. When
/// a field appears in both, its placeholder binds the record's value in the
/// `SET` and the `WHERE` clause alike.
///
/// # Errors
///
/// Returns [`StatementError::EmptyRecord`] if `record` has no fields and
/// [`StatementError::EmptyCondition`] if `condition` has none.
pub fn build_update(table: &str, record: &Record, condition: &Record) -> Result<StatementText> {
    require_fields(record, "UPDATE", table)?;
    require_condition(condition, "UPDATE", table)?;
    let set_clause = placeholder_pairs(record.keys(), ", ");
    let where_clause = placeholder_pairs(condition.keys(), " AND ");
    Ok(StatementText {
        sql: format!("UPDATE {table} SET {set_clause} WHERE {where_clause}"),
        params: record.merged_with(condition).normalized(),
    })
}

/// Builds `DELETE FROM table WHERE c = :c AND ...`.
///
/// # Errors
///
/// Returns [`StatementError::EmptyCondition`] if `condition` has no fields.
pub fn build_delete(table: &str, condition: &Record) -> Result<StatementText> {
    require_condition(condition, "DELETE", table)?;
    let where_clause = placeholder_pairs(condition.keys(), " AND ");
    Ok(StatementText {
        sql: format!("DELETE FROM {table} WHERE {where_clause}"),
        params: condition.normalized(),
    })
}

/// Builds `SELECT * FROM table`, with a `WHERE` clause only for a non-empty
/// condition.
pub fn build_select(table: &str, condition: Option<&Record>) -> StatementText {
    match condition {
        Some(condition) if !condition.is_empty() => StatementText {
            sql: format!(
                "SELECT * FROM {table} WHERE {}",
                placeholder_pairs(condition.keys(), " AND ")
            ),
            params: condition.normalized(),
        },
        _ => StatementText {
            sql: format!("SELECT * FROM {table}"),
            params: Record::new(),
        },
    }
}
