//! # Slot Client
//!
//! The cloneable, type-safe handle used to talk to a [`SlotActor`](crate::SlotActor).

use crate::entity::SlotEntity;
use crate::error::FrameworkError;
use crate::message::{Completed, SlotRequest, TaskId};
use tokio::sync::{mpsc, oneshot};

/// Forwards slot requests over an mpsc channel and awaits the oneshot reply.
///
/// Holds only a sender, so cloning is cheap and clones can be moved into
/// other tasks (the job runner keeps one to report completions).
pub struct SlotClient<T: SlotEntity> {
    sender: mpsc::Sender<SlotRequest<T>>,
}

impl<T: SlotEntity> Clone for SlotClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: SlotEntity> SlotClient<T> {
    pub fn new(sender: mpsc::Sender<SlotRequest<T>>) -> Self {
        Self { sender }
    }

    /// Occupies the task owner's slot. Fails with `SlotBusy` if it is taken.
    pub async fn enqueue(
        &self,
        task: T,
        continuation: Option<T::Continuation>,
    ) -> Result<TaskId, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SlotRequest::Enqueue {
                task,
                continuation,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Reports completion of task `id` and takes its continuation.
    pub async fn complete(&self, owner: T::Owner, id: TaskId) -> Result<Completed<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SlotRequest::Complete {
                owner,
                id,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Frees the owner's slot, dropping the continuation.
    pub async fn cancel(&self, owner: T::Owner) -> Result<Option<(TaskId, T)>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SlotRequest::Cancel { owner, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn active(&self, owner: T::Owner) -> Result<Option<(TaskId, T)>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SlotRequest::Active { owner, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
