//! Resolution of named connections into engines.

use recordsql_config::ConfigProvider;
use tracing::{instrument, warn};

use crate::engine::Engine;
use crate::error::{DbError, Result};

/// Turns connection names from the configuration into [`Engine`]s.
///
/// Borrows the [`ConfigProvider`], so the configuration file is read at most
/// once no matter how many names are resolved.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionManager<'c> {
    config: &'c ConfigProvider,
}

impl<'c> ConnectionManager<'c> {
    pub fn new(config: &'c ConfigProvider) -> Self {
        Self { config }
    }

    /// Resolves `name` to a connected engine.
    ///
    /// # Errors
    ///
    /// - [`DbError::Config`] on the first resolve if the configuration file
    ///   is missing or malformed.
    /// - [`DbError::ConnectionNameUnknown`] if `name` is not registered. No
    ///   I/O is attempted.
    /// - [`DbError::ConnectionFailed`] if the connection string is
    ///   malformed or the database cannot be opened.
    #[instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<Engine> {
        let config = self.config.load()?;
        let Some(url) = config.connection_string(name) else {
            warn!(connection = name, "connection name not found");
            return Err(DbError::ConnectionNameUnknown(name.to_string()));
        };
        Engine::connect(name, url, &config.pool)
    }
}
