use querydrop_core::ExportError;
use thiserror::Error;

/// Errors raised while opening a connection or running the query.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The connection string names a backend we cannot open.
    #[error("Unsupported connection string '{0}' (expected sqlite: or postgres://)")]
    UnsupportedScheme(String),

    /// Host unreachable, bad credentials, missing database file, …
    #[error("Failed to connect to {backend}: {reason}")]
    Connect {
        backend: &'static str,
        reason: String,
    },

    /// Syntax error or execution failure.
    #[error("Query failed: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

impl From<SourceError> for ExportError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Query(_) => ExportError::Query(e.to_string()),
            other => ExportError::Connection(other.to_string()),
        }
    }
}
