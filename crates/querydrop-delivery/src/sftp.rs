//! Upload over SFTP.
//!
//! The transport is modelled as three small traits so the upload sequence
//! (connect → authenticate → open session → ensure directory → put → close)
//! is independent of the SSH library. [`crate::ssh::Ssh2Connector`] is the
//! production implementation.

use std::ops::{Deref, DerefMut};

use querydrop_core::{Artifact, SftpSettings};
use tracing::{info, warn};

use crate::error::Result;
use crate::Delivery;

/// Opens transports to a server.
pub trait SftpConnector: Send + Sync {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Transport>>;
}

/// A connected, possibly not yet authenticated, SSH transport.
pub trait Transport {
    fn authenticate(&mut self, user: &str, password: &str) -> Result<()>;
    fn open_sftp(&mut self) -> Result<Box<dyn RemoteFs>>;
    fn close(&mut self);
}

/// The file-transfer session running on top of a transport.
pub trait RemoteFs {
    /// `Ok(false)` when the path does not exist; other failures are errors.
    fn exists(&self, path: &str) -> Result<bool>;
    fn mkdir(&self, path: &str) -> Result<()>;
    fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;
    fn close(&mut self);
}

/// Closes the transport when dropped.
struct TransportGuard(Box<dyn Transport>);

impl Deref for TransportGuard {
    type Target = dyn Transport;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for TransportGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for TransportGuard {
    fn drop(&mut self) {
        self.0.close();
        info!("SFTP transport closed");
    }
}

/// Closes the file-transfer session when dropped.
struct SessionGuard(Box<dyn RemoteFs>);

impl Deref for SessionGuard {
    type Target = dyn RemoteFs;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.close();
        info!("SFTP session closed");
    }
}

/// Result of making sure the remote directory exists. Neither outcome stops
/// the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDir {
    Present,
    /// Directories that had to be created, outermost first.
    Created(Vec<String>),
    /// Creation failed part way; the upload is still attempted.
    CreateFailed(String),
}

/// Probe `remote_path` and, if it is missing, create it one component at a
/// time. Absolute paths are walked from `/`.
pub fn ensure_remote_dir(fs: &dyn RemoteFs, remote_path: &str) -> Result<RemoteDir> {
    if fs.exists(remote_path)? {
        return Ok(RemoteDir::Present);
    }
    info!(path = remote_path, "remote path not found, creating");

    let mut created = Vec::new();
    let mut current = String::new();
    if remote_path.starts_with('/') {
        current.push('/');
    }
    for part in remote_path.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() && !current.ends_with('/') {
            current.push('/');
        }
        current.push_str(part);

        let step = fs.exists(&current).and_then(|exists| {
            if exists {
                Ok(false)
            } else {
                fs.mkdir(&current).map(|()| true)
            }
        });
        match step {
            Ok(true) => {
                info!(path = %current, "created remote directory");
                created.push(current.clone());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = remote_path, "could not create remote directory: {e}; upload might fail");
                return Ok(RemoteDir::CreateFailed(e.to_string()));
            }
        }
    }
    if created.is_empty() {
        Ok(RemoteDir::Present)
    } else {
        Ok(RemoteDir::Created(created))
    }
}

/// `<remote_path>/<filename>` with exactly one separator.
pub fn remote_file_path(remote_path: &str, filename: &str) -> String {
    format!("{}/{}", remote_path.trim_end_matches('/'), filename)
}

pub struct SftpDelivery<C: SftpConnector> {
    settings: SftpSettings,
    connector: C,
}

impl<C: SftpConnector> SftpDelivery<C> {
    pub fn new(settings: SftpSettings, connector: C) -> Self {
        Self {
            settings,
            connector,
        }
    }
}

impl<C: SftpConnector> Delivery for SftpDelivery<C> {
    fn name(&self) -> &str {
        "sftp"
    }

    fn try_deliver(&self, artifact: &Artifact, filename: &str) -> Result<String> {
        let s = &self.settings;

        // Guards drop in reverse order: session first, then transport.
        let mut transport = TransportGuard(self.connector.connect(&s.host, s.port)?);
        transport.authenticate(&s.user, &s.password)?;
        let session = SessionGuard(transport.open_sftp()?);
        info!(host = %s.host, port = s.port, "connected to SFTP server");

        ensure_remote_dir(&*session, &s.remote_path)?;

        let remote = remote_file_path(&s.remote_path, filename);
        session.put(&remote, artifact.as_bytes())?;
        Ok(format!("{}:{}", s.host, remote))
    }
}
