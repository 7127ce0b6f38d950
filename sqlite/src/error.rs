//! Error types for database access.
//!
//! Every failure is returned to the caller; nothing in this crate panics or
//! retries.

use recordsql_config::ConfigError;
use recordsql_core::StatementError;
use thiserror::Error;

/// Errors that can occur while connecting to or using a database.
#[derive(Debug, Error)]
pub enum DbError {
    /// The configuration file could not be loaded (first access only).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No connection string is registered under this name.
    #[error("connection '{0}' not found in ConnectionSetting")]
    ConnectionNameUnknown(String),

    /// The connection string is malformed or the database cannot be opened.
    #[error("failed to connect '{name}': {message}")]
    ConnectionFailed { name: String, message: String },

    /// The operation needs an engine and none is set.
    #[error("no active database connection")]
    NoActiveConnection,

    /// The database rejected the statement or the connection was lost.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A table spec that cannot be executed.
    #[error("invalid table spec: {0}")]
    InvalidTableSpec(String),

    /// The statement could not be built (e.g. an unconditional `DELETE`).
    #[error(transparent)]
    Statement(StatementError),
}

impl DbError {
    /// Returns `true` for the empty-condition guard on `UPDATE`/`DELETE`.
    ///
    /// Callers typically log these as warnings rather than errors: no
    /// statement was sent.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Statement(err) if err.is_warning())
    }
}

impl From<StatementError> for DbError {
    fn from(err: StatementError) -> Self {
        match err {
            StatementError::InvalidTableSpec(message) => Self::InvalidTableSpec(message),
            other => Self::Statement(other),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}

impl From<r2d2::Error> for DbError {
    fn from(err: r2d2::Error) -> Self {
        Self::ExecutionFailed(format!("could not acquire a pooled connection: {err}"))
    }
}

/// Convenience alias for results with [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
