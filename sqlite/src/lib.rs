//! SQLite access layer for dynamically-typed records.
//!
//! This crate connects named connection strings from a
//! [`ConfigProvider`](recordsql_config::ConfigProvider) to pooled SQLite
//! engines and runs the statements built by [`recordsql_core`].
//!
//! # Architecture
//!
//! - **`engine`**: connection-string parsing and the r2d2 pool
//! - **`connection`**: name → [`Engine`] resolution through the configuration
//! - **`executor`**: parameter binding, read/write dispatch, row materialization
//! - **`schema`**: table creation from a [`TableSpec`](recordsql_core::TableSpec)
//! - **`database`**: the [`Database`] facade callers hold
//!
//! # Quick start
//!
//! ```no_run
//! use recordsql_config::ConfigProvider;
//! use recordsql_core::Record;
//! use recordsql_sqlite::{Database, QueryResult};
//!
//! let config = ConfigProvider::new("config.json");
//! let db = Database::connect(&config, "Default").unwrap();
//!
//! db.execute("CREATE TABLE Users (Name TEXT, Age INTEGER)", None, false).unwrap();
//! db.insert("Users", &Record::new().with("Name", "Ann").with("Age", 31)).unwrap();
//!
//! if let QueryResult::Row(Some(row)) = db.execute("SELECT * FROM Users", None, true).unwrap() {
//!     println!("{row:?}");
//! }
//! ```
//!
//! # Failure model
//!
//! Every operation returns a [`DbError`]; none panics and none retries.
//! Without an engine, operations fail with
//! [`DbError::NoActiveConnection`] and perform no I/O. `update` and
//! `delete` with an empty condition are refused with a warning-class error
//! ([`DbError::is_warning`]).

mod connection;
mod database;
mod engine;
mod error;
mod executor;
mod schema;

pub use connection::ConnectionManager;
pub use database::Database;
pub use engine::{DatabaseTarget, Engine, SqliteManager};
pub use error::{DbError, Result};
pub use executor::{QueryResult, execute, is_select};
pub use schema::create_table;
