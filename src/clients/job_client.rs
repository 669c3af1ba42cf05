use crate::job::{CraftJob, JobError};
use crate::model::ActorId;
use crate::scheduler::{Continuation, JobQueue};
use async_trait::async_trait;
use job_slot::{FrameworkError, QueueClient, SlotClient, TaskId};
use tracing::{debug, info, instrument};

/// Client for the actor job slot.
///
/// `complete` is the completion callback: whoever ran the job reports it
/// here and gets the continuation back, once.
#[derive(Clone)]
pub struct JobClient {
    inner: SlotClient<CraftJob>,
}

impl JobClient {
    pub fn new(inner: SlotClient<CraftJob>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, job, continuation), fields(actor = %job.owner))]
    pub async fn start(&self, job: CraftJob, continuation: Continuation) -> Result<TaskId, JobError> {
        debug!(?job, remaining = continuation.remaining.len(), "start called");
        self.inner
            .enqueue(job, Some(continuation))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, owner: ActorId, id: TaskId) -> Result<Option<Continuation>, JobError> {
        let done = self.inner.complete(owner, id).await.map_err(Self::map_error)?;
        info!(job = %done.task.step.describe(), chained = done.continuation.is_some(), "Job reported complete");
        Ok(done.continuation)
    }
}

#[async_trait]
impl QueueClient<CraftJob> for JobClient {
    type Error = JobError;

    fn inner(&self) -> &SlotClient<CraftJob> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::SlotBusy(msg) => JobError::SlotBusy(msg),
            FrameworkError::NotFound(msg) => JobError::NotFound(msg),
            FrameworkError::EntityError(e) => JobError::Rejected(e.to_string()),
            e => JobError::ActorCommunicationError(e.to_string()),
        }
    }
}

#[async_trait]
impl JobQueue for JobClient {
    async fn enqueue(&self, job: CraftJob, continuation: Continuation) -> Result<TaskId, JobError> {
        self.start(job, continuation).await
    }

    async fn active(&self, actor: &ActorId) -> Result<Option<CraftJob>, JobError> {
        let active = QueueClient::active(self, actor.clone()).await?;
        Ok(active.map(|(_, job)| job))
    }

    async fn cancel(&self, actor: &ActorId) -> Result<Option<CraftJob>, JobError> {
        let cancelled = QueueClient::cancel(self, actor.clone()).await?;
        Ok(cancelled.map(|(_, job)| job))
    }
}
