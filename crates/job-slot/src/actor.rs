//! # Slot Actor
//!
//! The `SlotActor` is the server half of the queue. It owns one slot per owner
//! and processes requests sequentially, so the slot map needs no locking.
//!
//! ## State machine (per owner)
//!
//! ```text
//!   IDLE --Enqueue--> ACTIVE --Complete--> IDLE
//!                        |  \--Cancel----> IDLE
//!                        \--Enqueue-----> rejected (SlotBusy)
//! ```
//!
//! A completed task's continuation is moved out to the caller that reported
//! completion; a cancelled task's continuation is dropped.

use crate::client::SlotClient;
use crate::entity::SlotEntity;
use crate::error::FrameworkError;
use crate::message::{Completed, SlotRequest, TaskId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Occupied<T: SlotEntity> {
    id: TaskId,
    task: T,
    continuation: Option<T::Continuation>,
}

/// Single-slot task queue keyed by owner.
///
/// # Usage Pattern
///
/// 1. **Create**: `SlotActor::new()` returns the actor and a cloneable client.
/// 2. **Wire**: pass the context (e.g. the job runner) into `actor.run(context)`.
/// 3. **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use job_slot::{SlotActor, SlotEntity};
///
/// #[derive(Clone, Debug)]
/// struct Chore { owner: String }
/// #[derive(Debug, thiserror::Error)] #[error("chore error")] struct ChoreError;
///
/// impl SlotEntity for Chore {
///     type Owner = String;
///     type Continuation = String;
///     type Context = ();
///     type Error = ChoreError;
///     fn owner(&self) -> &String { &self.owner }
///     fn summary(&self) -> String { "chore".into() }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = SlotActor::<Chore>::new(8);
///     tokio::spawn(actor.run(()));
///
///     let chore = Chore { owner: "steve".into() };
///     let id = client.enqueue(chore, Some("then rest".into())).await.unwrap();
///     let done = client.complete("steve".into(), id).await.unwrap();
///     assert_eq!(done.continuation.as_deref(), Some("then rest"));
/// }
/// ```
pub struct SlotActor<T: SlotEntity> {
    receiver: mpsc::Receiver<SlotRequest<T>>,
    slots: HashMap<T::Owner, Occupied<T>>,
    next_id: u64,
}

impl<T: SlotEntity> SlotActor<T> {
    /// Creates a new `SlotActor` and its associated `SlotClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; senders wait when
    /// it is full.
    pub fn new(buffer_size: usize) -> (Self, SlotClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            slots: HashMap::new(),
            next_id: 1,
        };
        (actor, SlotClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Slot actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SlotRequest::Enqueue {
                    task,
                    continuation,
                    respond_to,
                } => {
                    let owner = task.owner().clone();
                    debug!(entity_type, %owner, ?task, "Enqueue");
                    if let Some(active) = self.slots.get(&owner) {
                        warn!(entity_type, %owner, active = %active.id, "Slot busy");
                        let _ = respond_to.send(Err(FrameworkError::SlotBusy(format!(
                            "{} is already running {}",
                            owner,
                            active.task.summary()
                        ))));
                        continue;
                    }

                    let id = TaskId(self.next_id);
                    self.next_id += 1;

                    let mut task = task;
                    if let Err(e) = task.on_enqueue(id, &context).await {
                        warn!(entity_type, %owner, error = %e, "on_enqueue failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    info!(
                        entity_type,
                        %owner,
                        %id,
                        task = %task.summary(),
                        chained = continuation.is_some(),
                        "Enqueued"
                    );
                    self.slots.insert(
                        owner,
                        Occupied {
                            id,
                            task,
                            continuation,
                        },
                    );
                    let _ = respond_to.send(Ok(id));
                }
                SlotRequest::Complete {
                    owner,
                    id,
                    respond_to,
                } => {
                    debug!(entity_type, %owner, %id, "Complete");
                    // A stale id must not free the slot of a newer task.
                    let is_active = self.slots.get(&owner).is_some_and(|a| a.id == id);
                    let done = if is_active {
                        self.slots.remove(&owner)
                    } else {
                        None
                    };
                    match done {
                        Some(done) => {
                            info!(entity_type, %owner, %id, active = self.slots.len(), "Completed");
                            let _ = respond_to.send(Ok(Completed {
                                id: done.id,
                                task: done.task,
                                continuation: done.continuation,
                            }));
                        }
                        None => {
                            warn!(entity_type, %owner, %id, "No such active task");
                            let _ = respond_to
                                .send(Err(FrameworkError::NotFound(format!("{owner}/{id}"))));
                        }
                    }
                }
                SlotRequest::Cancel { owner, respond_to } => {
                    debug!(entity_type, %owner, "Cancel");
                    let Some(active) = self.slots.get(&owner) else {
                        let _ = respond_to.send(Ok(None));
                        continue;
                    };
                    if let Err(e) = active.task.on_cancel(active.id, &context).await {
                        warn!(entity_type, %owner, error = %e, "on_cancel failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    let cancelled = self.slots.remove(&owner).map(|occupied| {
                        info!(
                            entity_type,
                            %owner,
                            id = %occupied.id,
                            dropped_continuation = occupied.continuation.is_some(),
                            "Cancelled"
                        );
                        (occupied.id, occupied.task)
                    });
                    let _ = respond_to.send(Ok(cancelled));
                }
                SlotRequest::Active { owner, respond_to } => {
                    let active = self
                        .slots
                        .get(&owner)
                        .map(|occupied| (occupied.id, occupied.task.clone()));
                    debug!(entity_type, %owner, busy = active.is_some(), "Active");
                    let _ = respond_to.send(Ok(active));
                }
            }
        }

        info!(entity_type, active = self.slots.len(), "Shutdown");
    }
}
