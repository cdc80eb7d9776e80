use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::{
    error::{Result, SchedulerError},
    types::{Job, JobStatus, ScheduleMode, CHECK_INTERVAL},
};

/// Drives a single [`Job`]: runs it immediately, then, when armed, again
/// every interval until `shutdown` broadcasts `true`.
///
/// Runs execute on the blocking pool and are awaited in the loop, so two runs
/// never overlap. The next run is measured from the end of the previous one.
pub struct SchedulerEngine {
    job: Arc<dyn Job>,
    mode: ScheduleMode,
    check_every: Duration,
    runs: u64,
}

impl SchedulerEngine {
    pub fn new(job: Arc<dyn Job>, mode: ScheduleMode) -> Self {
        Self {
            job,
            mode,
            check_every: CHECK_INTERVAL,
            runs: 0,
        }
    }

    /// Override how often the loop checks whether a run is due.
    pub fn with_check_interval(mut self, check_every: Duration) -> Self {
        self.check_every = check_every;
        self
    }

    /// Main event loop. Returns the number of runs executed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(job = self.job.name(), mode = ?self.mode, "scheduler engine started");
        self.execute().await;

        let every = match self.mode {
            ScheduleMode::Armed { every } => every,
            ScheduleMode::SingleShot => {
                info!("single-shot mode, scheduler engine stopping");
                return self.runs;
            }
        };

        let Some(mut next_run) = Instant::now().checked_add(every) else {
            error!(every_secs = every.as_secs(), "interval too large, not scheduling");
            return self.runs;
        };
        log_next_run(every);

        let mut interval =
            tokio::time::interval_at(Instant::now() + self.check_every, self.check_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if Instant::now() >= next_run {
                        self.execute().await;
                        let Some(at) = Instant::now().checked_add(every) else {
                            error!(every_secs = every.as_secs(), "interval too large, not scheduling");
                            break;
                        };
                        next_run = at;
                        log_next_run(every);
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender can never signal again; treat it as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
        self.runs
    }

    async fn execute(&mut self) {
        self.runs += 1;
        let run = self.runs;
        info!(job = self.job.name(), run, "executing scheduled job");

        match self.spawn_run().await {
            Ok(status) => info!(job = self.job.name(), run, %status, "job finished"),
            Err(e) => error!(run, "{e}"),
        }
    }

    async fn spawn_run(&self) -> Result<JobStatus> {
        let job = Arc::clone(&self.job);
        tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| SchedulerError::JobAborted {
                name: self.job.name().to_string(),
                reason: e.to_string(),
            })
    }
}

fn log_next_run(every: Duration) {
    let at = chrono::Duration::from_std(every)
        .ok()
        .and_then(|d| chrono::Local::now().checked_add_signed(d));
    match at {
        Some(at) => info!(next_run = %at.format("%Y-%m-%d %H:%M:%S"), "next run scheduled"),
        None => info!(every_secs = every.as_secs(), "next run scheduled"),
    }
}
