//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported on the first load of a configuration file.
///
/// After any of these, the provider caches an empty configuration so that
/// later lookups behave deterministically.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but is not valid JSON, or its sections have the wrong shape.
    #[error("malformed configuration file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Any other read failure (permissions, not a file, ...).
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
