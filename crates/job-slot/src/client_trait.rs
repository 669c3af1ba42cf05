//! # QueueClient Trait
//!
//! Common interface for domain-specific wrappers around [`SlotClient`]. Wrappers
//! get `active` and `cancel` for free and only decide how framework errors map
//! onto their own error type.
use crate::{FrameworkError, SlotClient, SlotEntity, TaskId};
use async_trait::async_trait;

/// Trait for domain clients built on a `SlotClient`.
///
/// # Example
///
/// ```rust
/// use job_slot::{FrameworkError, QueueClient, SlotClient, SlotEntity};
///
/// #[derive(Clone, Debug)]
/// struct Chore { owner: String }
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct ChoreError(String);
/// impl From<String> for ChoreError { fn from(s: String) -> Self { ChoreError(s) } }
///
/// impl SlotEntity for Chore {
///     type Owner = String;
///     type Continuation = ();
///     type Context = ();
///     type Error = ChoreError;
///     fn owner(&self) -> &String { &self.owner }
///     fn summary(&self) -> String { "chore".into() }
/// }
///
/// struct ChoreClient { inner: SlotClient<Chore> }
///
/// impl QueueClient<Chore> for ChoreClient {
///     type Error = ChoreError;
///     fn inner(&self) -> &SlotClient<Chore> { &self.inner }
///     fn map_error(e: FrameworkError) -> ChoreError { ChoreError(e.to_string()) }
/// }
///
/// async fn usage(client: ChoreClient) {
///     // active() and cancel() come from the trait.
///     let _ = client.active("steve".into()).await;
///     let _ = client.cancel("steve".into()).await;
/// }
/// ```
#[async_trait]
pub trait QueueClient<T: SlotEntity>: Send + Sync {
    /// The domain-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic SlotClient.
    fn inner(&self) -> &SlotClient<T>;

    /// Map framework errors to the domain error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// The owner's active task, if any.
    #[tracing::instrument(skip(self))]
    async fn active(&self, owner: T::Owner) -> Result<Option<(TaskId, T)>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().active(owner).await.map_err(Self::map_error)
    }

    /// Cancel the owner's active task, dropping its continuation.
    #[tracing::instrument(skip(self))]
    async fn cancel(&self, owner: T::Owner) -> Result<Option<(TaskId, T)>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().cancel(owner).await.map_err(Self::map_error)
    }
}
