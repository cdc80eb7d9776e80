//! `ssh2` (libssh2) backed SFTP transport.

use std::io::Write;
use std::net::TcpStream;
use std::path::Path;

use tracing::debug;

use crate::error::{DeliveryError, Result};
use crate::sftp::{RemoteFs, SftpConnector, Transport};

/// libssh2 status for a missing path (`LIBSSH2_FX_NO_SUCH_FILE`).
const FX_NO_SUCH_FILE: i32 = 2;
const DIR_MODE: i32 = 0o755;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ssh2Connector;

impl SftpConnector for Ssh2Connector {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Transport>> {
        let connect_err = |reason: String| DeliveryError::Connect {
            host: host.to_string(),
            port,
            reason,
        };

        let tcp = TcpStream::connect((host, port)).map_err(|e| connect_err(e.to_string()))?;
        let mut session = ssh2::Session::new().map_err(|e| connect_err(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| connect_err(e.to_string()))?;
        debug!(host, port, "SSH handshake complete");

        Ok(Box::new(Ssh2Transport { session }))
    }
}

struct Ssh2Transport {
    session: ssh2::Session,
}

impl Transport for Ssh2Transport {
    fn authenticate(&mut self, user: &str, password: &str) -> Result<()> {
        let denied = || DeliveryError::AuthFailed {
            user: user.to_string(),
        };
        self.session
            .userauth_password(user, password)
            .map_err(|e| {
                debug!("password auth rejected: {e}");
                denied()
            })?;
        if !self.session.authenticated() {
            return Err(denied());
        }
        Ok(())
    }

    fn open_sftp(&mut self) -> Result<Box<dyn RemoteFs>> {
        let sftp = self.session.sftp().map_err(protocol)?;
        Ok(Box::new(Ssh2Sftp { sftp: Some(sftp) }))
    }

    fn close(&mut self) {
        if let Err(e) = self.session.disconnect(None, "export finished", None) {
            debug!("SSH disconnect failed: {e}");
        }
    }
}

struct Ssh2Sftp {
    sftp: Option<ssh2::Sftp>,
}

impl Ssh2Sftp {
    fn handle(&self) -> Result<&ssh2::Sftp> {
        self.sftp
            .as_ref()
            .ok_or_else(|| DeliveryError::Protocol("SFTP session already closed".to_string()))
    }
}

impl RemoteFs for Ssh2Sftp {
    fn exists(&self, path: &str) -> Result<bool> {
        match self.handle()?.stat(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ssh2::ErrorCode::SFTP(FX_NO_SUCH_FILE) => Ok(false),
            Err(e) => Err(protocol(e)),
        }
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        self.handle()?
            .mkdir(Path::new(path), DIR_MODE)
            .map_err(protocol)
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut file = self.handle()?.create(Path::new(path)).map_err(protocol)?;
        file.write_all(bytes)
            .map_err(|e| DeliveryError::Protocol(format!("write to {path} failed: {e}")))?;
        file.close().map_err(protocol)?;
        debug!(path, bytes = bytes.len(), "remote file written");
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the handle closes the SFTP channel.
        self.sftp.take();
    }
}

fn protocol(e: ssh2::Error) -> DeliveryError {
    DeliveryError::Protocol(e.to_string())
}
