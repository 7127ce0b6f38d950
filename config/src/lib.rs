//! Configuration provider for named database connections.
//!
//! Reads a JSON document once and caches it for the lifetime of a
//! [`ConfigProvider`]. The `ConnectionSetting` section maps connection names
//! to connection strings; `PoolSetting` sizes each engine's pool; any other
//! section is reachable through [`AppConfig::get_value`].
//!
//! A missing or malformed file is reported once, on first load, and an
//! empty configuration is used from then on, so a caller looking up a
//! connection afterwards simply finds nothing.
//!
//! # Quick start
//!
//! ```no_run
//! use recordsql_config::{ConfigProvider, DEFAULT_CONNECTION};
//!
//! let provider = ConfigProvider::new("config.json");
//! match provider.load() {
//!     Ok(config) => println!("{} connections", config.connections.len()),
//!     Err(err) => eprintln!("config unavailable: {err}"),
//! }
//! let url = provider.config().connection_string(DEFAULT_CONNECTION);
//! ```

mod error;
mod provider;

pub use error::{ConfigError, Result};
pub use provider::{
    AppConfig, ConfigProvider, ConnectionRegistry, DEFAULT_CONFIG_FILE, DEFAULT_CONNECTION,
    PoolSettings,
};
