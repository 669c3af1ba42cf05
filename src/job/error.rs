//! Error types for craft jobs.

use thiserror::Error;

/// Errors that can occur while queueing or completing a craft job.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobError {
    /// The actor already has a job running.
    #[error("Slot busy: {0}")]
    SlotBusy(String),

    /// No active job matches the reported completion.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The job was refused when it was queued.
    #[error("Job rejected: {0}")]
    Rejected(String),

    /// An error occurred while communicating with the slot actor.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for JobError {
    fn from(msg: String) -> Self {
        JobError::ActorCommunicationError(msg)
    }
}
