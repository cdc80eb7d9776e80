//! `querydrop-delivery`: put a rendered artifact where it belongs.
//!
//! Two destinations implement [`Delivery`]: [`LocalDelivery`] (a directory on
//! this machine) and [`SftpDelivery`] (a directory on a remote server).

pub mod error;
pub mod local;
pub mod sftp;
pub mod ssh;

use querydrop_core::{Artifact, DeliveryResult, DeliveryTarget};
use tracing::{error, info};

pub use error::{DeliveryError, Result};
pub use local::LocalDelivery;
pub use sftp::{RemoteDir, SftpDelivery};
pub use ssh::Ssh2Connector;

/// A destination for artifacts.
pub trait Delivery: Send + Sync {
    /// Stable lowercase identifier (e.g. `"local"`).
    fn name(&self) -> &str;

    /// Write `artifact` as `filename`. Returns a human-readable location.
    ///
    /// The export pipeline calls this so the failure keeps its error kind.
    fn try_deliver(&self, artifact: &Artifact, filename: &str) -> Result<String>;

    /// Boolean form of [`try_deliver`](Delivery::try_deliver) for callers
    /// that only need success or failure; the error is logged here.
    fn deliver(&self, artifact: &Artifact, filename: &str) -> DeliveryResult {
        match self.try_deliver(artifact, filename) {
            Ok(location) => {
                info!(method = self.name(), %location, bytes = artifact.len(), "artifact delivered");
                DeliveryResult::ok(filename)
            }
            Err(e) => {
                error!(method = self.name(), filename, "delivery failed: {e}");
                DeliveryResult::failed(filename)
            }
        }
    }
}

/// Build the delivery configured for this run.
pub fn for_target(target: &DeliveryTarget) -> Box<dyn Delivery> {
    match target {
        DeliveryTarget::Local { dir } => Box::new(LocalDelivery::new(dir.clone())),
        DeliveryTarget::Sftp(settings) => {
            Box::new(SftpDelivery::new(settings.clone(), Ssh2Connector))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querydrop_core::SftpSettings;

    #[test]
    fn target_selects_implementation() {
        let local = for_target(&DeliveryTarget::Local {
            dir: "./output".into(),
        });
        assert_eq!(local.name(), "local");

        let sftp = for_target(&DeliveryTarget::Sftp(SftpSettings {
            host: "h".into(),
            port: 22,
            user: "u".into(),
            password: "p".into(),
            remote_path: "/r".into(),
        }));
        assert_eq!(sftp.name(), "sftp");
    }
}
