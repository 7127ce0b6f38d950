//! Error types for statement construction.
//!
//! Statement building is pure, so the only failures are caller mistakes
//! caught before any SQL leaves this crate.

use thiserror::Error;

/// Errors that can occur while building SQL text from records.
#[derive(Debug, Error)]
pub enum StatementError {
    /// An `UPDATE` or `DELETE` was requested with no condition fields.
    ///
    /// Such a statement would touch every row of the table, so it is
    /// refused instead of being generated.
    #[error("refusing to build unconditional {operation} on table '{table}': condition is empty")]
    EmptyCondition {
        operation: &'static str,
        table: String,
    },

    /// An `INSERT` or `UPDATE` was requested with no data fields.
    #[error("cannot build {operation} on table '{table}': record has no fields")]
    EmptyRecord {
        operation: &'static str,
        table: String,
    },

    /// A JSON value that has no scalar SQL counterpart (array or object).
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// A table definition that cannot be turned into `CREATE TABLE` text.
    #[error("invalid table spec: {0}")]
    InvalidTableSpec(String),
}

impl StatementError {
    /// Returns `true` for the empty-condition guard.
    ///
    /// This is the only warning-class failure: nothing is wrong with the
    /// database, the caller asked for something destructive.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyCondition { .. })
    }
}

/// Convenience alias for results with [`StatementError`].
pub type Result<T> = std::result::Result<T, StatementError>;
