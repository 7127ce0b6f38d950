//! Table creation from a [`TableSpec`].

use recordsql_core::TableSpec;
use tracing::info;

use crate::engine::Engine;
use crate::error::Result;

/// Creates a table from a structured definition or runs a script verbatim.
///
/// The SQL runs in its own transaction. A script may hold several
/// statements.
///
/// # Errors
///
/// Returns [`DbError::InvalidTableSpec`](crate::DbError::InvalidTableSpec)
/// before touching the database if the spec cannot produce SQL, and
/// [`DbError::ExecutionFailed`](crate::DbError::ExecutionFailed) if the
/// database rejects it (e.g. the table already exists).
pub fn create_table(engine: &Engine, spec: &TableSpec) -> Result<()> {
    let sql = spec.to_sql()?;
    let mut conn = engine.acquire()?;
    let tx = conn.transaction()?;
    tx.execute_batch(&sql)?;
    tx.commit()?;

    match spec {
        TableSpec::Definition(table) => info!(table = %table.name, "table created"),
        TableSpec::Script(_) => info!("table script executed"),
    }
    Ok(())
}
