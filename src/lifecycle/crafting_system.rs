use super::runner::{HopOutcome, SimulatedRunner};
use crate::catalog::RecipeCatalog;
use crate::clients::JobClient;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::job::{self, JobRunner};
use crate::model::{ActorId, ResourceId};
use crate::scheduler::{PlanResult, Scheduler};
use crate::stock::MemoryInventory;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs the planner against an in-memory world.
///
/// `CraftingSystem` is responsible for:
/// - **Lifecycle Management**: starting and stopping the job slot actor and
///   the simulated job runner
/// - **Dependency Wiring**: the slot actor hands accepted jobs to the runner,
///   the runner reports completions back and resumes the scheduler
///
/// # Example
///
/// ```ignore
/// let mut system = CraftingSystem::new(Arc::new(vanilla()?), &PlannerConfig::default(), inventory);
/// let result = system.run_to_completion(&steve, &"stone_pickaxe".into(), 1).await?;
/// system.shutdown().await?;
/// ```
pub struct CraftingSystem {
    pub scheduler: Arc<Scheduler>,

    /// Client for the job slot actor
    pub job_client: JobClient,

    /// The inventory jobs deposit into and the planner snapshots
    pub inventory: MemoryInventory,

    outcomes: mpsc::UnboundedReceiver<HopOutcome>,
    stop: oneshot::Sender<()>,
    runner: JoinHandle<()>,
    slot: JoinHandle<()>,
}

impl CraftingSystem {
    /// Spawns the slot actor and the runner. Must be called inside a Tokio runtime.
    pub fn new(catalog: Arc<RecipeCatalog>, config: &PlannerConfig, inventory: MemoryInventory) -> Self {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (slot_actor, job_client) = job::new(config.queue_buffer);
        let slot = tokio::spawn(slot_actor.run(JobRunner::new(started_tx)));

        let scheduler = Arc::new(Scheduler::new(
            catalog,
            config,
            Arc::new(inventory.clone()),
            Arc::new(job_client.clone()),
            Arc::new(inventory.clone()),
        ));

        let (outcome_tx, outcomes) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let runner = SimulatedRunner {
            inventory: inventory.clone(),
            jobs: job_client.clone(),
            scheduler: scheduler.clone(),
            outcomes: outcome_tx,
        };
        let runner = tokio::spawn(runner.run(started_rx, stop_rx));

        Self {
            scheduler,
            job_client,
            inventory,
            outcomes,
            stop,
            runner,
            slot,
        }
    }

    pub async fn plan(
        &self,
        actor: &ActorId,
        resource: &ResourceId,
        quantity: u32,
    ) -> Result<PlanResult, PlannerError> {
        self.scheduler.plan(actor, resource, quantity).await
    }

    pub async fn cancel(&self, actor: &ActorId) -> Result<bool, PlannerError> {
        self.scheduler.cancel(actor).await
    }

    /// Next resumed continuation, in completion order.
    pub async fn next_outcome(&mut self) -> Option<HopOutcome> {
        self.outcomes.recv().await
    }

    /// Plans the request and follows its job chain until it settles.
    ///
    /// Outcomes for other actors that arrive meanwhile are dropped.
    pub async fn run_to_completion(
        &mut self,
        actor: &ActorId,
        resource: &ResourceId,
        quantity: u32,
    ) -> Result<PlanResult, PlannerError> {
        let mut result = self.plan(actor, resource, quantity).await?;
        while matches!(result, PlanResult::Executing { .. }) {
            let Some(outcome) = self.next_outcome().await else {
                break;
            };
            if &outcome.actor != actor {
                continue;
            }
            info!(%actor, finished = %outcome.finished, "Hop done");
            result = outcome.result?;
        }
        Ok(result)
    }

    /// Stops the runner, closes the slot actor's channel and waits for both.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down crafting system...");
        let _ = self.stop.send(());
        drop(self.scheduler);
        drop(self.job_client);

        for handle in [self.runner, self.slot] {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(format!("Task failed: {:?}", e));
            }
        }
        info!("Crafting system shutdown complete.");
        Ok(())
    }
}
