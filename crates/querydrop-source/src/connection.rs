use std::time::Instant;

use querydrop_core::{config::redact_url, ResultSet};
use tracing::{debug, info};

use crate::error::{Result, SourceError};
use crate::{pg, sqlite};

/// Database family selected from the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        let lower = url.trim().to_ascii_lowercase();
        if lower.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else {
            Err(SourceError::UnsupportedScheme(redact_url(url)))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

enum Handle {
    Sqlite(rusqlite::Connection),
    Postgres(postgres::Client),
}

/// An open database connection scoped to a single run.
///
/// The underlying handle is released when this value is dropped, on every
/// exit path, including early returns and unwinding out of a failed fetch.
pub struct Connection {
    handle: Handle,
    backend: Backend,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("backend", &self.backend).finish()
    }
}

impl Connection {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Execute `query` exactly once and materialise every row.
    pub fn fetch(&mut self, query: &str) -> Result<ResultSet> {
        let started = Instant::now();
        debug!(backend = self.backend.name(), "executing query");
        let set = match &mut self.handle {
            Handle::Sqlite(conn) => sqlite::fetch(conn, query)?,
            Handle::Postgres(client) => pg::fetch(client, query)?,
        };
        info!(
            rows = set.row_count(),
            columns = set.column_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query fetched"
        );
        Ok(set)
    }

    /// Close explicitly. Equivalent to dropping the connection.
    pub fn close(self) {}
}

impl Drop for Connection {
    fn drop(&mut self) {
        info!(backend = self.backend.name(), "database connection closed");
    }
}

/// Open one connection for `url`.
pub fn connect(url: &str) -> Result<Connection> {
    let backend = Backend::from_url(url)?;
    let handle = match backend {
        Backend::Sqlite => Handle::Sqlite(sqlite::open(url)?),
        Backend::Postgres => Handle::Postgres(pg::open(url)?),
    };
    info!(backend = backend.name(), url = %redact_url(url), "database connection established");
    Ok(Connection { handle, backend })
}

/// Connect, run `query` once and release the connection before returning,
/// whether the fetch succeeded or not.
pub fn fetch_once(url: &str, query: &str) -> Result<ResultSet> {
    let mut conn = connect(url)?;
    let result = conn.fetch(query);
    conn.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use querydrop_core::Value;

    fn seeded_db() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (id INTEGER, region TEXT, amount REAL);
             INSERT INTO sales VALUES (3, 'west', 10.5);
             INSERT INTO sales VALUES (1, 'east', NULL);
             INSERT INTO sales VALUES (2, 'north, upper', 7.0);",
        )
        .unwrap();
        let url = format!("sqlite://{}", path.display());
        (dir, url)
    }

    #[test]
    fn backend_from_scheme() {
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("postgres://u@h/db").unwrap(), Backend::Postgres);
        assert_eq!(Backend::from_url("PostgreSQL://u@h/db").unwrap(), Backend::Postgres);
        assert!(matches!(
            Backend::from_url("mysql://u:pw@h/db"),
            Err(SourceError::UnsupportedScheme(ref u)) if !u.contains("pw")
        ));
    }

    #[test]
    fn fetch_preserves_database_order() {
        let (_dir, url) = seeded_db();
        let set = fetch_once(&url, "SELECT id, region, amount FROM sales").unwrap();
        assert_eq!(set.columns, vec!["id", "region", "amount"]);
        let ids: Vec<_> = set.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        assert_eq!(set.rows[1][2], Value::Null);
    }

    #[test]
    fn empty_result_keeps_columns() {
        let (_dir, url) = seeded_db();
        let set = fetch_once(&url, "SELECT id, region FROM sales WHERE id > 100").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.columns, vec!["id", "region"]);
    }

    #[test]
    fn bad_sql_is_query_error() {
        let (_dir, url) = seeded_db();
        let err = fetch_once(&url, "SELEC nonsense").unwrap_err();
        assert!(matches!(err, SourceError::Query(_)));
        let run_err: querydrop_core::ExportError = err.into();
        assert_eq!(run_err.code(), "QUERY_ERROR");
    }

    #[test]
    fn unreachable_postgres_is_connect_error() {
        // Port 1 is never a postgres server; the connect attempt is refused.
        let err = connect("postgres://nobody@127.0.0.1:1/none").unwrap_err();
        assert!(matches!(err, SourceError::Connect { backend: "postgres", .. }));
    }

    #[test]
    fn unsupported_scheme_is_connection_error() {
        let err: querydrop_core::ExportError = connect("oracle://x").unwrap_err().into();
        assert_eq!(err.code(), "CONNECTION_ERROR");
    }
}
