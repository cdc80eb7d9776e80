//! `querydrop-scheduler`: interval scheduler for the export job.
//!
//! # Overview
//!
//! The [`engine::SchedulerEngine`] runs its [`Job`] once at startup. When
//! armed with an interval it then checks every minute whether the next run
//! is due, executing it on the blocking pool. An invalid or missing interval
//! degrades to [`ScheduleMode::SingleShot`].
//!
//! | Mode         | Behaviour                                          |
//! |--------------|----------------------------------------------------|
//! | `Armed`      | Run now, then every N minutes after each run ends  |
//! | `SingleShot` | Run now and return                                 |

pub mod engine;
pub mod error;
pub mod types;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use types::{Job, JobStatus, ScheduleMode, CHECK_INTERVAL};
