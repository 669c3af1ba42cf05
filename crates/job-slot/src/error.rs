//! # Framework Errors
//!
//! Errors raised by the slot actor itself, as opposed to errors raised by the
//! entity hooks (those travel inside [`FrameworkError::EntityError`]).

/// Errors that can occur within the slot framework.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Slot actor closed")]
    ActorClosed,
    #[error("Slot actor dropped response channel")]
    ActorDropped,
    #[error("Slot busy: {0}")]
    SlotBusy(String),
    #[error("Task not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}
