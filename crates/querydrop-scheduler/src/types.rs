use std::time::Duration;

use querydrop_core::Settings;
use tracing::{error, info};

/// Fixed pause between "is the next run due?" checks.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Defines whether the job recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Run now, then again every `every` (measured from the end of a run).
    Armed { every: Duration },
    /// Run once now and stop. Used when no valid interval is configured.
    SingleShot,
}

impl ScheduleMode {
    pub fn every_minutes(minutes: u64) -> Self {
        ScheduleMode::Armed {
            every: Duration::from_secs(minutes.saturating_mul(60)),
        }
    }

    /// Derive the mode from the configured interval. An invalid interval is
    /// logged and downgrades to single-shot rather than failing.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.interval_minutes() {
            Ok(minutes) => {
                info!(minutes, "scheduling job to run every {minutes} minutes");
                Self::every_minutes(minutes)
            }
            Err(e) => {
                error!("{e}. Running job once now, but not scheduling.");
                ScheduleMode::SingleShot
            }
        }
    }
}

/// Outcome of one execution, as reported by the job itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Work driven by the scheduler. `run` is blocking and must not panic on
/// ordinary failures; it reports them through [`JobStatus`].
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn run(&self) -> JobStatus;
}
