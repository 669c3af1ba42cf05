//! # SlotEntity Trait
//!
//! The `SlotEntity` trait is the contract a task type fulfils to be held by a
//! [`SlotActor`](crate::SlotActor). A task is owned by exactly one owner (the
//! actor that performs it) and may carry an opaque continuation that is handed
//! back, once, when the task completes.
//!
//! Associated types keep the queue type-safe: a queue of `CraftJob`s only
//! accepts `CraftJob` continuations and reports `CraftJob` errors.
//!
//! # Provided Methods (Hooks)
//! - [`SlotEntity::on_enqueue`] runs after the slot accepted the task.
//! - [`SlotEntity::on_cancel`] runs before a cancelled task is dropped.
//!
//! Both default to `Ok(())`.

use crate::message::TaskId;
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any task type must implement to be scheduled by `SlotActor`.
///
/// # Async & Context
/// Hooks are async so they can talk to other actors. The `Context` is injected
/// through [`SlotActor::run`](crate::SlotActor::run), which lets the executor
/// of the tasks be wired in after the queue was created.
#[async_trait]
pub trait SlotEntity: Clone + Send + Sync + Debug + 'static {
    /// Identity of whoever owns the single slot (one active task per owner).
    type Owner: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Deferred "what to do next" payload attached to a task.
    type Continuation: Clone + Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// Error type returned by the hooks.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The owner whose slot this task occupies.
    fn owner(&self) -> &Self::Owner;

    /// Short human-readable description used in logs.
    fn summary(&self) -> String;

    /// Called after the task has been accepted into its owner's slot.
    ///
    /// Returning an error rejects the task and leaves the slot idle.
    async fn on_enqueue(&mut self, _id: TaskId, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before a cancelled task is dropped.
    async fn on_cancel(&self, _id: TaskId, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }
}
