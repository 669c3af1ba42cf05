//! # Slot Messages
//!
//! Message types exchanged between [`SlotClient`](crate::SlotClient) and
//! [`SlotActor`](crate::SlotActor).

use crate::entity::SlotEntity;
use crate::error::FrameworkError;
use std::fmt::Display;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the slot actor.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Identifier handed out for every accepted task. Monotonic per actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task_{}", self.0)
    }
}

/// What the slot hands back when a task completes.
///
/// The continuation is moved out of the slot, so it can only be observed by
/// the single caller that reported completion.
#[derive(Debug, Clone)]
pub struct Completed<T: SlotEntity> {
    pub id: TaskId,
    pub task: T,
    pub continuation: Option<T::Continuation>,
}

/// Requests understood by the slot actor.
///
/// - **Enqueue**: occupy the owner's slot. Fails with `SlotBusy` if a task is already active.
/// - **Complete**: free the slot and take the continuation.
/// - **Cancel**: free the slot and drop the continuation.
/// - **Active**: read the owner's active task, if any.
#[derive(Debug)]
pub enum SlotRequest<T: SlotEntity> {
    Enqueue {
        task: T,
        continuation: Option<T::Continuation>,
        respond_to: Response<TaskId>,
    },
    Complete {
        owner: T::Owner,
        id: TaskId,
        respond_to: Response<Completed<T>>,
    },
    Cancel {
        owner: T::Owner,
        respond_to: Response<Option<(TaskId, T)>>,
    },
    Active {
        owner: T::Owner,
        respond_to: Response<Option<(TaskId, T)>>,
    },
}
