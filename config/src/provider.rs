//! Load-once JSON configuration.
//!
//! The configuration document is read the first time it is needed and kept
//! for the lifetime of the [`ConfigProvider`]. Later edits to the file are
//! not observed.
//!
//! # Example file
//!
//! ```json
//! {
//!   "ConnectionSetting": {
//!     "Default": "sqlite:///app.db",
//!     "Scratch": "sqlite://"
//!   },
//!   "PoolSetting": { "MaxSize": 4, "ConnectionTimeoutSecs": 5 },
//!   "104Web": { "URL": "https://example.test/login" }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Connection name used when the caller does not pick one.
pub const DEFAULT_CONNECTION: &str = "Default";

/// File name used by [`ConfigProvider::default`].
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Connection name to connection string, in file order.
pub type ConnectionRegistry = IndexMap<String, String>;

fn default_max_size() -> u32 {
    4
}

fn default_connection_timeout_secs() -> u64 {
    5
}

/// Sizing of each engine's connection pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(rename = "MaxSize", default = "default_max_size")]
    pub max_size: u32,
    /// How long to wait for a pooled connection before failing.
    #[serde(
        rename = "ConnectionTimeoutSecs",
        default = "default_connection_timeout_secs"
    )]
    pub connection_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

/// Parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "ConnectionSetting", default)]
    pub connections: ConnectionRegistry,
    #[serde(rename = "PoolSetting", default)]
    pub pool: PoolSettings,
    /// The whole document, for [`AppConfig::get_value`].
    #[serde(skip)]
    raw: serde_json::Value,
}

impl AppConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] for invalid JSON or for
    /// a `ConnectionSetting`/`PoolSetting` section of the wrong shape.
    pub fn from_json_str(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        let mut config: AppConfig = serde_json::from_value(raw.clone())?;
        config.raw = raw;
        Ok(config)
    }

    /// Builds a configuration holding only the given connections.
    pub fn with_connections<I, K, V>(connections: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            connections: connections
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Looks up a connection string by name.
    pub fn connection_string(&self, name: &str) -> Option<&str> {
        self.connections.get(name).map(String::as_str)
    }

    /// Looks up a nested value by dotted path, e.g. `"104Web.URL"`.
    ///
    /// Returns `None` as soon as a segment is missing or the current value
    /// is not an object.
    pub fn get_value(&self, path: &str) -> Option<&serde_json::Value> {
        path.split('.')
            .try_fold(&self.raw, |current, key| current.as_object()?.get(key))
    }
}

/// Single-owner, load-once access to the configuration file.
///
/// Construct one per process (or per test) and hand it by reference to
/// whatever needs connection strings.
///
/// # Examples
///
/// ```no_run
/// use recordsql_config::{ConfigProvider, DEFAULT_CONNECTION};
///
/// let provider = ConfigProvider::new("config.json");
/// if let Err(err) = provider.load() {
///     eprintln!("{err}");
/// }
/// let conn = provider.config().connection_string(DEFAULT_CONNECTION);
/// ```
#[derive(Debug)]
pub struct ConfigProvider {
    path: PathBuf,
    cache: OnceLock<AppConfig>,
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigProvider {
    /// Creates a provider for `path`. Nothing is read until the first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    /// Creates a provider that is already loaded with `config`.
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            path: PathBuf::new(),
            cache: OnceLock::from(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the file has been read (successfully or not).
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Returns the configuration, reading the file on first use.
    ///
    /// # Errors
    ///
    /// Only the first call can fail: [`ConfigError::NotFound`],
    /// [`ConfigError::Malformed`] or [`ConfigError::Io`]. An empty
    /// configuration is cached in that case, and every later call returns
    /// it.
    pub fn load(&self) -> Result<&AppConfig> {
        if let Some(config) = self.cache.get() {
            return Ok(config);
        }

        let (config, outcome) = match self.read() {
            Ok(config) => {
                debug!(
                    path = %self.path.display(),
                    connections = config.connections.len(),
                    "loaded configuration"
                );
                (config, Ok(()))
            }
            Err(err) => {
                warn!(error = %err, "using empty configuration");
                (AppConfig::default(), Err(err))
            }
        };

        let cached = self.cache.get_or_init(|| config);
        outcome.map(|()| cached)
    }

    /// Like [`load`](Self::load), but a first-load failure only logs and
    /// yields the empty configuration.
    pub fn config(&self) -> &AppConfig {
        match self.load() {
            Ok(config) => config,
            Err(_) => self.cache.get_or_init(AppConfig::default),
        }
    }

    /// Shorthand for `self.config().get_value(path)`.
    pub fn get_value(&self, path: &str) -> Option<&serde_json::Value> {
        self.config().get_value(path)
    }

    fn read(&self) -> Result<AppConfig> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        AppConfig::from_json_str(&text).map_err(|source| ConfigError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "ConnectionSetting": {
                "Default": "sqlite:///app.db",
                "Reporting": "sqlite:////var/lib/reports.db"
            },
            "PoolSetting": { "MaxSize": 8 },
            "104Web": { "URL": "https://example.test/login", "Username": "me" }
        }"#
    }

    #[test]
    fn test_parse_complete() {
        let config = AppConfig::from_json_str(sample_json()).unwrap();
        assert_eq!(config.connection_string("Default"), Some("sqlite:///app.db"));
        assert_eq!(
            config.connection_string("Reporting"),
            Some("sqlite:////var/lib/reports.db")
        );
        assert_eq!(config.connection_string("Missing"), None);
        assert_eq!(config.pool.max_size, 8);
        assert_eq!(config.pool.connection_timeout_secs, 5);
    }

    #[test]
    fn test_parse_minimal() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert!(config.connections.is_empty());
        assert_eq!(config.pool, PoolSettings::default());
    }

    #[test]
    fn test_connection_order_preserved() {
        let config = AppConfig::from_json_str(sample_json()).unwrap();
        let names: Vec<_> = config.connections.keys().map(String::as_str).collect();
        assert_eq!(names, ["Default", "Reporting"]);
    }

    #[test]
    fn test_wrong_section_shape_is_error() {
        assert!(AppConfig::from_json_str(r#"{"ConnectionSetting": ["a"]}"#).is_err());
        assert!(AppConfig::from_json_str(r#"{"ConnectionSetting": {"a": 1}}"#).is_err());
        assert!(AppConfig::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_get_value_dotted_path() {
        let config = AppConfig::from_json_str(sample_json()).unwrap();
        assert_eq!(
            config.get_value("104Web.URL"),
            Some(&serde_json::json!("https://example.test/login"))
        );
        assert_eq!(config.get_value("PoolSetting.MaxSize"), Some(&serde_json::json!(8)));
        assert_eq!(config.get_value("104Web.Password"), None);
        assert_eq!(config.get_value("104Web.URL.deeper"), None);
        assert_eq!(config.get_value("Nope"), None);
    }

    #[test]
    fn test_from_config_needs_no_file() {
        let provider =
            ConfigProvider::from_config(AppConfig::with_connections([("Default", "sqlite://")]));
        assert!(provider.is_loaded());
        assert_eq!(
            provider.load().unwrap().connection_string("Default"),
            Some("sqlite://")
        );
    }
}
