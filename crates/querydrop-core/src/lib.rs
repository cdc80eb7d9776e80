//! `querydrop-core`: settings, the job config snapshot, the tabular data
//! model shared by every stage and the run-level error taxonomy.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DeliveryTarget, JobConfig, RawValue, Settings, SftpSettings};
pub use error::{ConfigError, ExportError};
pub use types::{Artifact, DeliveryMethod, DeliveryResult, OutputFormat, ResultSet, Value};
