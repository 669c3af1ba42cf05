//! # Mock Slot & Testing Guide
//!
//! [`MockSlot<T>`] hands out a real [`SlotClient<T>`] whose requests are served
//! by a background task replaying scripted expectations instead of a
//! [`SlotActor`](crate::SlotActor). Code that talks to the queue (a planner,
//! a client wrapper) can then be tested without running the slot state
//! machine, and failures that are hard to provoke for real (a closed actor, a
//! busy slot) are one line to script.
//!
//! | | MockSlot | Real SlotActor |
//! |---|---|---|
//! | **State** | none, scripted replies | real per-owner slots |
//! | **Determinism** | total | subject to scheduler |
//! | **Error injection** | `return_err` | needs real state |
//!
//! Every enqueued task and continuation is recorded and can be inspected with
//! [`MockSlot::enqueued`].
//!
//! ```rust
//! use job_slot::mock::MockSlot;
//! use job_slot::{FrameworkError, SlotEntity, TaskId};
//!
//! #[derive(Clone, Debug)]
//! struct Chore { owner: String }
//! #[derive(Debug, thiserror::Error)] #[error("chore error")] struct ChoreError;
//! impl SlotEntity for Chore {
//!     type Owner = String; type Continuation = String; type Context = (); type Error = ChoreError;
//!     fn owner(&self) -> &String { &self.owner }
//!     fn summary(&self) -> String { "chore".into() }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockSlot::<Chore>::new();
//!     mock.expect_enqueue().return_ok(TaskId(7));
//!     mock.expect_enqueue().return_err(FrameworkError::SlotBusy("steve".into()));
//!
//!     let client = mock.client();
//!     let chore = Chore { owner: "steve".into() };
//!     assert_eq!(client.enqueue(chore.clone(), Some("next".into())).await.unwrap(), TaskId(7));
//!     assert!(client.enqueue(chore, None).await.is_err());
//!
//!     assert_eq!(mock.enqueued()[0].1.as_deref(), Some("next"));
//!     mock.verify();
//! }
//! ```
//!
//! For step-by-step control use [`create_mock_client`] and answer requests
//! yourself with [`expect_enqueue`] / [`expect_complete`].

use crate::client::SlotClient;
use crate::entity::SlotEntity;
use crate::error::FrameworkError;
use crate::message::{Completed, Response, SlotRequest, TaskId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation<T: SlotEntity> {
    Enqueue {
        response: Result<TaskId, FrameworkError>,
    },
    Complete {
        response: Result<Completed<T>, FrameworkError>,
    },
    Cancel {
        response: Result<Option<(TaskId, T)>, FrameworkError>,
    },
    Active {
        response: Result<Option<(TaskId, T)>, FrameworkError>,
    },
}

type Recorded<T> = Vec<(T, Option<<T as SlotEntity>::Continuation>)>;

/// A scripted stand-in for a `SlotActor`.
pub struct MockSlot<T: SlotEntity> {
    client: SlotClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    enqueued: Arc<Mutex<Recorded<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: SlotEntity> Default for MockSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SlotEntity> MockSlot<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<SlotRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let enqueued = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let enqueued_clone = enqueued.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        SlotRequest::Enqueue {
                            task,
                            continuation,
                            respond_to,
                        },
                        Some(Expectation::Enqueue { response }),
                    ) => {
                        enqueued_clone.lock().unwrap().push((task, continuation));
                        let _ = respond_to.send(response);
                    }
                    (
                        SlotRequest::Complete { respond_to, .. },
                        Some(Expectation::Complete { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        SlotRequest::Cancel { respond_to, .. },
                        Some(Expectation::Cancel { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        SlotRequest::Active { respond_to, .. },
                        Some(Expectation::Active { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected slot request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: SlotClient::new(sender),
            expectations,
            enqueued,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> SlotClient<T> {
        self.client.clone()
    }

    pub fn expect_enqueue(&mut self) -> ExpectationBuilder<T, TaskId> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Enqueue {
            response,
        })
    }

    pub fn expect_complete(&mut self) -> ExpectationBuilder<T, Completed<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Complete {
            response,
        })
    }

    pub fn expect_cancel(&mut self) -> ExpectationBuilder<T, Option<(TaskId, T)>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Cancel {
            response,
        })
    }

    pub fn expect_active(&mut self) -> ExpectationBuilder<T, Option<(TaskId, T)>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Active {
            response,
        })
    }

    /// Every task (and its continuation) received by an `Enqueue`, in order.
    pub fn enqueued(&self) -> Recorded<T> {
        self.enqueued.lock().unwrap().clone()
    }

    /// Panics if some expectations were never consumed.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T: SlotEntity, R> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: SlotEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Answer the request successfully.
    pub fn return_ok(self, value: R) {
        let expectation = (self.wrap)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Answer the request with an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.wrap)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// MANUAL HELPERS
// =============================================================================

/// Creates a client plus the receiving end of its channel.
///
/// The test plays the actor: it pulls requests off the receiver, asserts on
/// them and answers through the oneshot sender.
pub fn create_mock_client<T: SlotEntity>(
    buffer_size: usize,
) -> (SlotClient<T>, mpsc::Receiver<SlotRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (SlotClient::new(sender), receiver)
}

/// Pulls the next request and returns it if it is an Enqueue.
pub async fn expect_enqueue<T: SlotEntity>(
    receiver: &mut mpsc::Receiver<SlotRequest<T>>,
) -> Option<(T, Option<T::Continuation>, Response<TaskId>)> {
    match receiver.recv().await {
        Some(SlotRequest::Enqueue {
            task,
            continuation,
            respond_to,
        }) => Some((task, continuation, respond_to)),
        _ => None,
    }
}

/// Pulls the next request and returns it if it is a Complete.
pub async fn expect_complete<T: SlotEntity>(
    receiver: &mut mpsc::Receiver<SlotRequest<T>>,
) -> Option<(T::Owner, TaskId, Response<Completed<T>>)> {
    match receiver.recv().await {
        Some(SlotRequest::Complete {
            owner,
            id,
            respond_to,
        }) => Some((owner, id, respond_to)),
        _ => None,
    }
}
