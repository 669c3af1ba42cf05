//! Craft jobs: the async steps the actor's task queue runs one at a time.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::JobClient;
use crate::model::{ActorId, JobKind, Step};
use job_slot::{SlotActor, TaskId};
use tokio::sync::mpsc;

/// One async step queued for an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftJob {
    pub owner: ActorId,
    pub kind: JobKind,
    pub step: Step,
}

impl CraftJob {
    pub fn new(owner: ActorId, kind: JobKind, step: Step) -> Self {
        Self { owner, kind, step }
    }
}

/// A job the slot accepted, on its way to whoever performs it.
#[derive(Debug, Clone)]
pub struct StartedJob {
    pub id: TaskId,
    pub job: CraftJob,
}

/// Hands accepted jobs to their executor.
///
/// Detached runners accept every job and tell no one; completion is then
/// reported by hand through [`JobClient::complete`].
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    notify: Option<mpsc::UnboundedSender<StartedJob>>,
}

impl JobRunner {
    pub fn new(notify: mpsc::UnboundedSender<StartedJob>) -> Self {
        Self {
            notify: Some(notify),
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn start(&self, id: TaskId, job: CraftJob) -> Result<(), JobError> {
        let Some(notify) = &self.notify else {
            return Ok(());
        };
        notify
            .send(StartedJob { id, job })
            .map_err(|_| JobError::Rejected("job runner has stopped".to_string()))
    }
}

/// Creates the job slot actor and its client.
pub fn new(buffer_size: usize) -> (SlotActor<CraftJob>, JobClient) {
    let (actor, generic_client) = SlotActor::new(buffer_size);
    (actor, JobClient::new(generic_client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepType;
    use job_slot::SlotEntity;

    fn chop(quantity: u32) -> Step {
        Step {
            step_type: StepType::Chop,
            resource: "oak_log".into(),
            quantity,
            runs: quantity,
            output_per_run: 1,
            produced: quantity,
            consumes: vec![],
        }
    }

    #[tokio::test]
    async fn test_runner_receives_accepted_job() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = JobRunner::new(tx);
        let mut job = CraftJob::new("steve".into(), JobKind::Chop, chop(3));

        job.on_enqueue(TaskId(4), &runner).await.unwrap();
        let started = rx.recv().await.unwrap();
        assert_eq!(started.id, TaskId(4));
        assert_eq!(started.job.summary(), "chop 3 oak_log");
    }

    #[tokio::test]
    async fn test_mismatched_kind_is_rejected() {
        let mut job = CraftJob::new("steve".into(), JobKind::Mine, chop(1));
        let result = job.on_enqueue(TaskId(1), &JobRunner::detached()).await;
        assert!(matches!(result, Err(JobError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_stopped_runner_rejects() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut job = CraftJob::new("steve".into(), JobKind::Chop, chop(1));
        let result = job.on_enqueue(TaskId(1), &JobRunner::new(tx)).await;
        assert_eq!(result, Err(JobError::Rejected("job runner has stopped".into())));
    }
}
