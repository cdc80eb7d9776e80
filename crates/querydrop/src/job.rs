use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use querydrop_core::{DeliveryResult, ExportError, JobConfig, Settings};
use querydrop_render::resolve_filename;
use querydrop_scheduler::{Job, JobStatus};
use tracing::{error, info, warn};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub result: DeliveryResult,
    pub location: String,
    pub rows: usize,
    pub bytes: usize,
}

/// The export pipeline: resolve config, fetch, render, name, deliver.
///
/// Settings are extracted once at startup and shared; the run-level
/// [`JobConfig`] is rebuilt (and re-validated) on every execution.
pub struct ExportJob {
    settings: Arc<Settings>,
}

impl ExportJob {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Execute one run. Any error aborts this run only.
    pub fn run_once(&self) -> Result<RunSummary, ExportError> {
        let config = JobConfig::resolve(&self.settings)?;

        let set = querydrop_source::fetch_once(&config.db_url, &config.query)?;
        if set.is_empty() {
            warn!(columns = set.column_count(), "query returned no rows");
        }

        let artifact = querydrop_render::render(&set, config.include_header, config.format)?;
        let filename = resolve_filename(&config.filename_pattern, &Local::now(), config.format);

        let delivery = querydrop_delivery::for_target(&config.delivery);
        let location = delivery.try_deliver(&artifact, &filename)?;

        Ok(RunSummary {
            result: DeliveryResult::ok(filename),
            location,
            rows: set.row_count(),
            bytes: artifact.len(),
        })
    }
}

impl Job for ExportJob {
    fn name(&self) -> &str {
        "export"
    }

    fn run(&self) -> JobStatus {
        let started = Instant::now();
        let outcome = self.run_once();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(summary) => {
                info!(
                    success = summary.result.success,
                    filename = %summary.result.filename,
                    location = %summary.location,
                    rows = summary.rows,
                    bytes = summary.bytes,
                    elapsed_ms,
                    "export run finished"
                );
                JobStatus::Completed
            }
            Err(e) => {
                error!(success = false, code = e.code(), elapsed_ms, "export run aborted: {e}");
                JobStatus::Failed
            }
        }
    }
}
