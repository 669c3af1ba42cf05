use crate::clients::JobClient;
use crate::error::PlannerError;
use crate::job::StartedJob;
use crate::model::ActorId;
use crate::scheduler::{PlanResult, Scheduler};
use crate::stock::MemoryInventory;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// What happened after a job completed and its continuation was resumed.
#[derive(Debug)]
pub struct HopOutcome {
    pub actor: ActorId,
    /// Summary of the job that just finished.
    pub finished: String,
    pub result: Result<PlanResult, PlannerError>,
}

/// Stands in for the game world: every job finishes right away.
///
/// Inputs are withdrawn as far as they are there, the step's full output is
/// deposited, completion is reported and the continuation resumed.
pub(crate) struct SimulatedRunner {
    pub(crate) inventory: MemoryInventory,
    pub(crate) jobs: JobClient,
    pub(crate) scheduler: Arc<Scheduler>,
    pub(crate) outcomes: mpsc::UnboundedSender<HopOutcome>,
}

impl SimulatedRunner {
    pub(crate) async fn run(
        self,
        mut started: mpsc::UnboundedReceiver<StartedJob>,
        mut stop: oneshot::Receiver<()>,
    ) {
        info!("Job runner started");
        loop {
            tokio::select! {
                _ = &mut stop => break,
                next = started.recv() => match next {
                    Some(job) => self.perform(job).await,
                    None => break,
                },
            }
        }
        info!("Job runner stopped");
    }

    async fn perform(&self, started: StartedJob) {
        let StartedJob { id, job } = started;
        let actor = job.owner.clone();
        let finished = job.step.describe();
        tokio::task::yield_now().await;

        for input in &job.step.consumes {
            if !self.inventory.withdraw(&actor, &input.resource, input.quantity) {
                warn!(%actor, job_id = %id, resource = %input.resource, quantity = input.quantity, "Input gone before the job ran");
            }
        }
        self.inventory.deposit(&actor, &job.step.resource, job.step.produced);
        info!(%actor, job_id = %id, job = %finished, "Job finished");

        let result = match self.jobs.complete(actor.clone(), id).await {
            Ok(Some(continuation)) => self.scheduler.resume(continuation).await,
            Ok(None) => return,
            Err(e) => {
                warn!(%actor, job_id = %id, error = %e, "Completion not accepted");
                Err(e.into())
            }
        };
        let _ = self.outcomes.send(HopOutcome {
            actor,
            finished,
            result,
        });
    }
}
