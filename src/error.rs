//! Infrastructure errors surfaced by the planner.
//!
//! An unreachable target is not an error here: it comes back as a
//! [`PlanResult::MissingIngredients`](crate::scheduler::PlanResult) report.

use crate::catalog::CatalogError;
use crate::job::JobError;
use crate::scheduler::ContinuationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The job queue could not be reached or refused the request.
    #[error("Job queue error: {0}")]
    Queue(#[from] JobError),

    /// A stored continuation could not be decoded.
    #[error("Continuation error: {0}")]
    Continuation(#[from] ContinuationError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(String),
}
