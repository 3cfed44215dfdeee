//! Job error definitions.

use thiserror::Error;

/// Errors raised by built-in job bodies and the trigger.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The job could not be started or its output could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No job with this name is registered with the scheduler.
    #[error("unknown job: {0}")]
    UnknownJob(String),

    /// The job's schedule cannot be driven by a trigger loop.
    #[error("invalid schedule for job {job}: {reason}")]
    InvalidSchedule { job: String, reason: &'static str },
}
