use thiserror::Error;

/// Errors that can occur within the scheduler loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The job panicked or its blocking task was cancelled.
    #[error("Job '{name}' did not complete: {reason}")]
    JobAborted { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
