//! High-level record access over one engine.
//!
//! [`Database`] is what callers hold: it resolves a named connection once,
//! keeps the resulting [`Engine`] for its lifetime, and exposes CRUD,
//! script generation and table creation.
//!
//! # Example
//!
//! ```no_run
//! use recordsql_config::{ConfigProvider, DEFAULT_CONNECTION};
//! use recordsql_core::Record;
//! use recordsql_sqlite::Database;
//!
//! let config = ConfigProvider::new("config.json");
//! let db = Database::open(&config, DEFAULT_CONNECTION);
//!
//! let user = Record::new().with("Name", "O'Brien").with("Age", 30);
//! db.insert("Users", &user).unwrap();
//!
//! let found = db.select("Users", Some(&Record::new().with("Name", "O'Brien"))).unwrap();
//! println!("{} match(es)", found.len());
//!
//! // Log what a cleanup would do without running it.
//! println!("{}", db.generate_delete_sql("Users", &Record::new().with("Age", 30)).unwrap());
//! ```

use recordsql_config::ConfigProvider;
use recordsql_core::{
    Record, StatementText, TableDefinition, TableSpec, build_delete, build_insert, build_select,
    build_update, generate_create_table_sql, generate_delete_sql, generate_insert_sql,
    generate_select_sql, generate_update_sql,
};
use tracing::{debug, warn};

use crate::connection::ConnectionManager;
use crate::engine::Engine;
use crate::error::{DbError, Result};
use crate::executor::{self, QueryResult};
use crate::schema;

/// Record-oriented access to a single database.
///
/// Operations that touch the database fail with
/// [`DbError::NoActiveConnection`] when no engine is set. Script generation
/// never needs one.
#[derive(Debug, Default)]
pub struct Database {
    engine: Option<Engine>,
}

/// Logs a failure at the boundary and hands it back.
fn report(err: DbError) -> DbError {
    if err.is_warning() {
        warn!(error = %err, "statement refused");
    } else {
        warn!(error = %err, "database operation failed");
    }
    err
}

impl Database {
    /// Resolves `name` through `config`.
    ///
    /// A failure is logged and leaves the database without an engine; use
    /// [`connect`](Self::connect) to get the error instead.
    pub fn open(config: &ConfigProvider, name: &str) -> Self {
        let mut db = Self::default();
        if let Err(err) = db.resolve_connection(config, name) {
            debug!(connection = name, error = %err, "continuing without an engine");
        }
        db
    }

    /// Resolves `name` through `config`, failing if it cannot.
    ///
    /// # Errors
    ///
    /// See [`ConnectionManager::resolve`].
    pub fn connect(config: &ConfigProvider, name: &str) -> Result<Self> {
        let mut db = Self::default();
        db.resolve_connection(config, name)?;
        Ok(db)
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Replaces the current engine with one for `name`.
    ///
    /// On failure the previous engine is dropped and none is set.
    ///
    /// # Errors
    ///
    /// See [`ConnectionManager::resolve`].
    pub fn resolve_connection(&mut self, config: &ConfigProvider, name: &str) -> Result<&Engine> {
        self.engine = None;
        let engine = ConnectionManager::new(config).resolve(name).map_err(report)?;
        Ok(self.engine.insert(engine))
    }

    /// Drops the engine, closing its pooled connections.
    pub fn disconnect(&mut self) {
        self.engine = None;
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_some()
    }

    fn require_engine(&self) -> Result<&Engine> {
        self.engine
            .as_ref()
            .ok_or_else(|| report(DbError::NoActiveConnection))
    }

    /// Executes arbitrary SQL with optional `:name` parameters.
    ///
    /// # Errors
    ///
    /// [`DbError::NoActiveConnection`] without an engine, otherwise see
    /// [`executor::execute`].
    pub fn execute(
        &self,
        sql: &str,
        params: Option<&Record>,
        fetch_one: bool,
    ) -> Result<QueryResult> {
        let engine = self.require_engine()?;
        executor::execute(engine, sql, params, fetch_one).map_err(report)
    }

    fn write(&self, statement: Result<StatementText>) -> Result<usize> {
        let statement = statement.map_err(report)?;
        let engine = self.require_engine()?;
        debug!(sql = %statement.sql, "executing write");
        let mut conn = engine.acquire().map_err(report)?;
        executor::run_write(&mut conn, &statement.sql, &statement.params).map_err(report)
    }

    /// Inserts one row and returns the affected-row count.
    ///
    /// # Errors
    ///
    /// `EmptyRecord` for a record with no fields, `NoActiveConnection`, or
    /// `ExecutionFailed`.
    pub fn insert(&self, table: &str, record: &Record) -> Result<usize> {
        self.write(build_insert(table, record).map_err(DbError::from))
    }

    /// Updates rows matching every field of `condition`.
    ///
    /// # Errors
    ///
    /// An empty `condition` is refused with a warning-class
    /// [`DbError::Statement`] and nothing is executed.
    pub fn update(&self, table: &str, record: &Record, condition: &Record) -> Result<usize> {
        self.write(build_update(table, record, condition).map_err(DbError::from))
    }

    /// Deletes rows matching every field of `condition`.
    ///
    /// # Errors
    ///
    /// An empty `condition` is refused with a warning-class
    /// [`DbError::Statement`] and nothing is executed.
    pub fn delete(&self, table: &str, condition: &Record) -> Result<usize> {
        self.write(build_delete(table, condition).map_err(DbError::from))
    }

    fn read(&self, table: &str, condition: Option<&Record>, fetch_one: bool) -> Result<Vec<Record>> {
        let engine = self.require_engine()?;
        let statement = build_select(table, condition);
        debug!(sql = %statement.sql, "executing read");
        let conn = engine.acquire().map_err(report)?;
        executor::run_read(&conn, &statement.sql, &statement.params, fetch_one).map_err(report)
    }

    /// Returns all rows matching `condition`, or the whole table without one.
    ///
    /// # Errors
    ///
    /// `NoActiveConnection` or `ExecutionFailed`.
    pub fn select(&self, table: &str, condition: Option<&Record>) -> Result<Vec<Record>> {
        self.read(table, condition, false)
    }

    /// Returns the first row matching `condition`, if any.
    ///
    /// # Errors
    ///
    /// `NoActiveConnection` or `ExecutionFailed`.
    pub fn select_one(&self, table: &str, condition: Option<&Record>) -> Result<Option<Record>> {
        Ok(self.read(table, condition, true)?.into_iter().next())
    }

    /// Creates a table from a definition or script.
    ///
    /// # Errors
    ///
    /// `NoActiveConnection`, `InvalidTableSpec`, or `ExecutionFailed`.
    pub fn create_table(&self, spec: &TableSpec) -> Result<()> {
        let engine = self.require_engine()?;
        schema::create_table(engine, spec).map_err(report)
    }

    /// Literal form of [`insert`](Self::insert); see [`generate_insert_sql`].
    ///
    /// # Errors
    ///
    /// `EmptyRecord` for a record with no fields.
    pub fn generate_insert_sql(&self, table: &str, record: &Record) -> Result<String> {
        Ok(generate_insert_sql(table, record)?)
    }

    /// Literal form of [`update`](Self::update); see [`generate_update_sql`].
    ///
    /// # Errors
    ///
    /// `EmptyRecord` or the warning-class `EmptyCondition`.
    pub fn generate_update_sql(
        &self,
        table: &str,
        record: &Record,
        condition: &Record,
    ) -> Result<String> {
        Ok(generate_update_sql(table, record, condition)?)
    }

    /// Literal form of [`delete`](Self::delete), ending in `;`.
    ///
    /// # Errors
    ///
    /// The warning-class `EmptyCondition`.
    pub fn generate_delete_sql(&self, table: &str, condition: &Record) -> Result<String> {
        Ok(generate_delete_sql(table, condition)?)
    }

    /// Literal form of [`select`](Self::select).
    pub fn generate_select_sql(&self, table: &str, condition: Option<&Record>) -> String {
        generate_select_sql(table, condition)
    }

    /// The `CREATE TABLE` text [`create_table`](Self::create_table) would run.
    ///
    /// # Errors
    ///
    /// `InvalidTableSpec` for a table without a name or columns.
    pub fn generate_create_table_sql(&self, table: &TableDefinition) -> Result<String> {
        Ok(generate_create_table_sql(table)?)
    }
}
