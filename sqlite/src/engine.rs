//! Pooled SQLite engine.
//!
//! An [`Engine`] owns an r2d2 pool of connections to one database, given by
//! a URL-style connection string:
//!
//! | connection string            | database                 |
//! |------------------------------|--------------------------|
//! | `sqlite://`                  | private in-memory        |
//! | `sqlite:///:memory:`         | private in-memory        |
//! | `sqlite:///data/app.db`      | `data/app.db` (relative) |
//! | `sqlite:////var/lib/app.db`  | `/var/lib/app.db`        |
//!
//! A `+driver` suffix on the scheme (`sqlite+pysqlite://`) is ignored.
//! In-memory engines hold exactly one connection that is never reaped, so
//! every operation sees the same database.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use r2d2::{ManageConnection, Pool, PooledConnection};
use recordsql_config::PoolSettings;
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::{DbError, Result};

/// Where an engine's connections point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for a string without `://`, a
    /// dialect other than `sqlite`, or a host component.
    ///
    /// # Examples
    ///
    /// ```
    /// use recordsql_sqlite::DatabaseTarget;
    ///
    /// assert_eq!(DatabaseTarget::parse("sqlite://").unwrap(), DatabaseTarget::Memory);
    /// assert_eq!(
    ///     DatabaseTarget::parse("sqlite:////srv/app.db").unwrap(),
    ///     DatabaseTarget::File("/srv/app.db".into())
    /// );
    /// assert!(DatabaseTarget::parse("mssql+pyodbc://host/db").is_err());
    /// ```
    pub fn parse(url: &str) -> std::result::Result<Self, String> {
        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(format!("'{url}' is not a connection URL"));
        };
        let dialect = scheme.split('+').next().unwrap_or_default();
        if !dialect.eq_ignore_ascii_case("sqlite") {
            return Err(format!("unsupported database dialect '{scheme}'"));
        }
        if rest.is_empty() || rest == "/" || rest == "/:memory:" {
            return Ok(Self::Memory);
        }
        match rest.strip_prefix('/') {
            Some(path) => Ok(Self::File(PathBuf::from(path))),
            None => Err(format!(
                "sqlite URLs take no host; use sqlite:///{rest} for a relative path"
            )),
        }
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// r2d2 manager opening rusqlite connections to one target.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    target: DatabaseTarget,
    busy_timeout: Duration,
}

impl SqliteManager {
    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = match &self.target {
            DatabaseTarget::Memory => Connection::open_in_memory()?,
            DatabaseTarget::File(path) => Connection::open(path)?,
        };
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

impl ManageConnection for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        self.open()
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.execute_batch("SELECT 1;")
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Handle to a pool of connections bound to one connection string.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Engine {
    name: String,
    target: DatabaseTarget,
    pool: Pool<SqliteManager>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Opens a pool for `url`, labelled `name` in errors and logs.
    ///
    /// One connection is opened up front so that a bad path fails here
    /// rather than on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConnectionFailed`] if the URL is malformed or the
    /// database cannot be opened.
    #[instrument(skip(url, settings))]
    pub fn connect(name: &str, url: &str, settings: &PoolSettings) -> Result<Self> {
        let failed = |message: String| DbError::ConnectionFailed {
            name: name.to_string(),
            message,
        };

        let target = DatabaseTarget::parse(url).map_err(failed)?;
        let manager = SqliteManager {
            target: target.clone(),
            busy_timeout: Duration::from_secs(settings.connection_timeout_secs),
        };
        manager.open().map_err(|e| failed(e.to_string()))?;

        let builder = Pool::builder()
            .connection_timeout(Duration::from_secs(settings.connection_timeout_secs.max(1)));
        let builder = match target {
            DatabaseTarget::Memory => builder.max_size(1).idle_timeout(None).max_lifetime(None),
            DatabaseTarget::File(_) => builder.max_size(settings.max_size.max(1)),
        };
        let pool = builder.build(manager).map_err(|e| failed(e.to_string()))?;

        info!(database = %target, "database engine ready");
        Ok(Self {
            name: name.to_string(),
            target,
            pool,
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConnectionFailed`] if SQLite cannot allocate it.
    pub fn in_memory() -> Result<Self> {
        Self::connect("memory", "sqlite://", &PoolSettings::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    /// Number of connections currently held by the pool, idle or in use.
    pub fn pooled_connections(&self) -> u32 {
        self.pool.state().connections
    }

    /// Checks out a connection; it returns to the pool when dropped.
    pub(crate) fn acquire(&self) -> Result<PooledConnection<SqliteManager>> {
        Ok(self.pool.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_forms() {
        for url in ["sqlite://", "sqlite:///", "sqlite:///:memory:", "SQLite+pysqlite://"] {
            assert_eq!(DatabaseTarget::parse(url).unwrap(), DatabaseTarget::Memory, "{url}");
        }
    }

    #[test]
    fn test_parse_file_paths() {
        assert_eq!(
            DatabaseTarget::parse("sqlite:///data/app.db").unwrap(),
            DatabaseTarget::File("data/app.db".into())
        );
        assert_eq!(
            DatabaseTarget::parse("sqlite:////var/lib/app.db").unwrap(),
            DatabaseTarget::File("/var/lib/app.db".into())
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert!(DatabaseTarget::parse("app.db").is_err());
        assert!(DatabaseTarget::parse("mssql+pyodbc://user:pw@host/db").is_err());
        assert!(DatabaseTarget::parse("sqlite://host/app.db").is_err());
    }

    #[test]
    fn test_connect_malformed_url() {
        let err = Engine::connect("Default", "not a url", &PoolSettings::default()).unwrap_err();
        match err {
            DbError::ConnectionFailed { name, .. } => assert_eq!(name, "Default"),
            other => panic!("expected ConnectionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_unopenable_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite:///{}",
            dir.path().join("missing-dir").join("app.db").display()
        );
        let err = Engine::connect("Default", &url, &PoolSettings::default()).unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed { .. }));
    }

    #[test]
    fn test_in_memory_single_connection() {
        let engine = Engine::in_memory().unwrap();
        assert_eq!(engine.target(), &DatabaseTarget::Memory);
        assert_eq!(engine.pooled_connections(), 1);
    }
}
