//! # Job Slot
//!
//! A generic **single-slot task queue** built on the Actor Model with Tokio.
//!
//! Every owner (an in-game actor, a worker, a robot) may have at most one
//! long-running task in flight. The queue accepts a task together with an
//! optional *continuation*, an opaque payload describing what should happen
//! after the task. When the task's executor reports completion the slot is
//! freed and the continuation is handed back, exactly once, to the caller
//! that reported it. Cancelling drops the continuation.
//!
//! The queue never runs tasks itself and never polls: execution is the job of
//! whatever context is wired into [`SlotActor::run`], and forward progress is
//! driven by whoever calls [`SlotClient::complete`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`SlotEntity`]) - the task type and its hooks
//! 2. **Runtime** ([`SlotActor`]) - per-owner slots, processed sequentially
//! 3. **Interface** ([`SlotClient`], [`QueueClient`]) - type-safe async API
//!
//! ## Concurrency Model
//!
//! - The actor runs in its own Tokio task and owns the slot map outright.
//! - Requests are processed one at a time, so "is the slot free?" and
//!   "occupy it" can never interleave between two callers.
//! - Clients are cheap clones of an mpsc sender; the actor shuts down when
//!   the last one is dropped.
//!
//! ## Testing
//!
//! [`mock::MockSlot`] serves a real `SlotClient` from scripted replies and
//! records everything enqueued. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

pub use actor::SlotActor;
pub use client::SlotClient;
pub use client_trait::QueueClient;
pub use entity::SlotEntity;
pub use error::FrameworkError;
pub use message::{Completed, Response, SlotRequest, TaskId};
