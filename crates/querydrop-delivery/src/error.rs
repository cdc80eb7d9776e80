use querydrop_core::ExportError;
use thiserror::Error;

/// Delivery failures. None of these escape [`Delivery::deliver`]; they are
/// logged and reported as an unsuccessful [`DeliveryResult`].
///
/// [`Delivery::deliver`]: crate::Delivery::deliver
/// [`DeliveryResult`]: querydrop_core::DeliveryResult
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Local filesystem failure (permissions, disk full, …).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TCP connect or SSH handshake failed.
    #[error("Could not reach SFTP server {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("SFTP authentication failed for user '{user}'")]
    AuthFailed { user: String },

    /// Any other SSH/SFTP failure after the session was established.
    #[error("SFTP error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;

impl DeliveryError {
    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        DeliveryError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl From<DeliveryError> for ExportError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::Connect { .. } | DeliveryError::AuthFailed { .. } => {
                ExportError::Connection(e.to_string())
            }
            other => ExportError::Delivery(other.to_string()),
        }
    }
}
