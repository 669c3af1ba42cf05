//! [`SlotEntity`] implementation for [`CraftJob`].
//!
//! A job is accepted only if its kind matches its step, and once accepted it
//! is handed to the [`JobRunner`] wired into the slot actor.

use super::{CraftJob, JobError, JobRunner};
use crate::model::ActorId;
use crate::scheduler::Continuation;
use async_trait::async_trait;
use job_slot::{SlotEntity, TaskId};
use tracing::debug;

#[async_trait]
impl SlotEntity for CraftJob {
    type Owner = ActorId;
    type Continuation = Continuation;
    type Context = JobRunner;
    type Error = JobError;

    fn owner(&self) -> &ActorId {
        &self.owner
    }

    fn summary(&self) -> String {
        self.step.describe()
    }

    async fn on_enqueue(&mut self, id: TaskId, runner: &JobRunner) -> Result<(), JobError> {
        if self.step.job_kind() != Some(self.kind) {
            return Err(JobError::Rejected(format!(
                "a {} job cannot {}",
                self.kind,
                self.step.describe()
            )));
        }
        runner.start(id, self.clone())
    }

    async fn on_cancel(&self, id: TaskId, _runner: &JobRunner) -> Result<(), JobError> {
        debug!(actor = %self.owner, job_id = %id, job = %self.summary(), "Job abandoned");
        Ok(())
    }
}
