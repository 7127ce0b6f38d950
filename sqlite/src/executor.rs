//! Statement execution against an [`Engine`].
//!
//! [`execute`] decides between a read and a write by looking at the text
//! only: after trimming, a statement whose lowercase form starts with
//! `select` is a read. Anything else (including `WITH ... SELECT` and
//! statements preceded by a comment) is a write. The check is deliberately
//! textual; it is not a parser.
//!
//! Writes run in their own transaction and commit before returning. Their
//! affected-row count is the number of rows the statement itself changed,
//! so DDL reports 0. Rows a write happens to produce are stepped through
//! and discarded. Each call holds a pooled connection only for its own
//! duration.

use recordsql_core::{DATETIME_FORMAT, Record, Value};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, Statement};
use tracing::{debug, instrument};

use crate::engine::Engine;
use crate::error::{DbError, Result};

/// Outcome of [`execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// All rows of a read, in result order.
    Rows(Vec<Record>),
    /// The first row of a read made with `fetch_one`, or `None` if it was empty.
    Row(Option<Record>),
    /// Rows affected by a write.
    Affected(usize),
}

impl QueryResult {
    /// Returns the rows of a read; a single-row result yields zero or one row.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Self::Rows(rows) => rows,
            Self::Row(row) => row.into_iter().collect(),
            Self::Affected(_) => Vec::new(),
        }
    }

    /// Returns the affected-row count of a write.
    pub fn affected(&self) -> Option<usize> {
        match self {
            Self::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

/// Returns `true` if `sql` is treated as a read.
///
/// # Examples
///
/// ```
/// use recordsql_sqlite::is_select;
///
/// assert!(is_select("  SeLeCt * FROM Users"));
/// assert!(!is_select("-- list\nSELECT 1"));
/// assert!(!is_select("UPDATE Users SET Age = 1"));
/// ```
pub fn is_select(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

/// Binds a [`Value`] the way the driver expects it.
struct BindValue<'a>(&'a Value);

impl ToSql for BindValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) if f.is_nan() => ToSqlOutput::Owned(SqlValue::Null),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(SqlValue::Text(dt.format(DATETIME_FORMAT).to_string()))
            }
        })
    }
}

/// Binds each parameter to its `:name` placeholder.
///
/// Parameters the statement does not mention are skipped; placeholders with
/// no parameter stay `NULL`.
fn bind_params(stmt: &mut Statement<'_>, params: &Record) -> Result<()> {
    for (name, value) in params.iter() {
        if let Some(index) = stmt.parameter_index(&format!(":{name}"))? {
            stmt.raw_bind_parameter(index, BindValue(value))?;
        }
    }
    Ok(())
}

fn read_value(value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Int(i)),
        ValueRef::Real(f) => Ok(Value::Float(f)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::Text(text.to_string()))
            .map_err(|e| DbError::ExecutionFailed(format!("TEXT column is not valid UTF-8: {e}"))),
        ValueRef::Blob(_) => Err(DbError::ExecutionFailed(
            "BLOB columns cannot be represented as record values".to_string(),
        )),
    }
}

/// Runs a read and materializes its rows, stopping after the first when
/// `fetch_one` is set.
pub(crate) fn run_read(
    conn: &Connection,
    sql: &str,
    params: &Record,
    fetch_one: bool,
) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    bind_params(&mut stmt, params)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.raw_query();
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (index, column) in columns.iter().enumerate() {
            record.insert(column.as_str(), read_value(row.get_ref(index)?)?);
        }
        records.push(record);
        if fetch_one {
            break;
        }
    }
    debug!(rows = records.len(), "read complete");
    Ok(records)
}

/// Runs a write in a transaction and commits it.
///
/// The count comes from the connection's running change total, which DDL
/// and plain reads leave untouched.
pub(crate) fn run_write(conn: &mut Connection, sql: &str, params: &Record) -> Result<usize> {
    let tx = conn.transaction()?;
    let before = tx.total_changes();
    {
        let mut stmt = tx.prepare(sql)?;
        bind_params(&mut stmt, params)?;
        let mut rows = stmt.raw_query();
        while rows.next()?.is_some() {}
    }
    let changed = tx.total_changes().saturating_sub(before);
    let affected = usize::try_from(changed).unwrap_or(usize::MAX);
    tx.commit()?;
    debug!(affected, "write committed");
    Ok(affected)
}

/// Executes `sql` with optional named parameters.
///
/// Reads return [`QueryResult::Rows`], or [`QueryResult::Row`] when
/// `fetch_one` is set. Writes return [`QueryResult::Affected`].
///
/// # Errors
///
/// Returns [`DbError::ExecutionFailed`] with the database's message for any
/// failure: pool exhaustion, syntax errors, constraint violations.
#[instrument(skip(engine, params), fields(connection = engine.name()))]
pub fn execute(
    engine: &Engine,
    sql: &str,
    params: Option<&Record>,
    fetch_one: bool,
) -> Result<QueryResult> {
    let empty = Record::new();
    let params = params.unwrap_or(&empty);
    let mut conn = engine.acquire()?;

    if is_select(sql) {
        let mut rows = run_read(&conn, sql, params, fetch_one)?;
        if fetch_one {
            Ok(QueryResult::Row(if rows.is_empty() { None } else { Some(rows.remove(0)) }))
        } else {
            Ok(QueryResult::Rows(rows))
        }
    } else {
        Ok(QueryResult::Affected(run_write(&mut conn, sql, params)?))
    }
}
