use std::fs;
use std::path::PathBuf;

use querydrop_core::Artifact;
use tracing::debug;

use crate::error::{DeliveryError, Result};
use crate::Delivery;

/// Writes artifacts into a directory on the local filesystem, creating it
/// (and any missing parents) first. Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct LocalDelivery {
    dir: PathBuf,
}

impl LocalDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Delivery for LocalDelivery {
    fn name(&self) -> &str {
        "local"
    }

    fn try_deliver(&self, artifact: &Artifact, filename: &str) -> Result<String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| DeliveryError::io(self.dir.display(), e))?;

        let path = self.dir.join(filename);
        debug!(path = %path.display(), kind = artifact.kind(), "writing artifact");
        fs::write(&path, artifact.as_bytes()).map_err(|e| DeliveryError::io(path.display(), e))?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join("b").join("c");
        let delivery = LocalDelivery::new(&dir);

        let artifact = Artifact::Text("id,name\n1,Ada\n".into());
        let result = delivery.deliver(&artifact, "out.csv");

        assert!(result.success);
        assert_eq!(result.filename, "out.csv");
        assert_eq!(fs::read(dir.join("out.csv")).unwrap(), artifact.as_bytes());
    }

    #[test]
    fn binary_written_verbatim_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let delivery = LocalDelivery::new(root.path());
        let target = root.path().join("report.pdf");
        fs::write(&target, b"stale contents that are longer").unwrap();

        let artifact = Artifact::Binary(vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff]);
        assert!(delivery.deliver(&artifact, "report.pdf").success);
        assert_eq!(fs::read(&target).unwrap(), artifact.as_bytes());
    }

    #[test]
    fn io_failure_reported_not_raised() {
        let root = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = root.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let delivery = LocalDelivery::new(blocker.join("sub"));

        let result = delivery.deliver(&Artifact::Text("x".into()), "f.csv");
        assert!(!result.success);

        let err = delivery
            .try_deliver(&Artifact::Text("x".into()), "f.csv")
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Io { .. }));
    }
}
