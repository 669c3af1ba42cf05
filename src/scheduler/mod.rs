//! # Continuation Scheduler
//!
//! Turns a compiled plan into at most one queued job per actor and picks the
//! plan back up when that job completes.
//!
//! ```text
//!   plan(actor, target) --snapshot--> resolve --> compile --> inject --> execute
//!                                                                          |
//!        +-----------------------------------------------------------------+
//!        |  sync crafts ready now:     assembled on the spot
//!        |  first mappable async step: enqueued with a Continuation
//!        |  nothing mappable left:     MissingIngredients report
//!        v
//!   job completes --> JobClient::complete --> Continuation --> resume(continuation)
//! ```
//!
//! `resume` never diffs the old plan. It snapshots stock again and re-plans
//! the original target, so whatever changed in the inventory while the job
//! ran is picked up. The continuation's `remaining` list is what the plan
//! looked like when the job was queued and drives [`Continuation::render`].

mod continuation;
mod report;

pub use continuation::{Continuation, ContinuationError};
pub use report::{MissingReport, ReportLine};

use crate::catalog::RecipeCatalog;
use crate::compiler::Plan;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::injector::{CatalogTiers, InjectionContext, Injector, Prerequisite, ToolTiers};
use crate::job::{CraftJob, JobError};
use crate::model::{ActorId, ResourceId, Step};
use crate::resolver::{DependencyNode, Resolver};
use crate::stock::StockSnapshot;
use async_trait::async_trait;
use job_slot::{SlotEntity, TaskId};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Performs a sync step against the actor's inventory.
pub trait Assembler: Send + Sync {
    fn craft(&self, actor: &ActorId, step: &Step) -> Result<(), AssemblyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("missing {quantity} {resource}")]
    Missing { resource: ResourceId, quantity: u32 },
    #[error("refused: {0}")]
    Refused(String),
}

/// The actor's single-slot job queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: CraftJob, continuation: Continuation) -> Result<TaskId, JobError>;

    /// The job holding the actor's slot, if any.
    async fn active(&self, actor: &ActorId) -> Result<Option<CraftJob>, JobError>;

    /// Frees the actor's slot and drops its continuation.
    async fn cancel(&self, actor: &ActorId) -> Result<Option<CraftJob>, JobError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanResult {
    /// Already owned; nothing to do.
    Satisfied,
    /// A job was queued and the rest of the plan rides on its continuation.
    Executing {
        ticket: TaskId,
        job_summary: String,
        continuation_summary: String,
    },
    /// Everything left was sync and has been crafted.
    Assembled { steps: Vec<Step> },
    MissingIngredients(MissingReport),
}

impl Display for PlanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfied => f.write_str("Already have it."),
            Self::Executing {
                job_summary,
                continuation_summary,
                ..
            } => write!(f, "Started: {job_summary}. {continuation_summary}"),
            Self::Assembled { steps } => {
                let parts: Vec<_> = steps.iter().map(Step::describe).collect();
                write!(f, "Done: {}.", parts.join(", "))
            }
            Self::MissingIngredients(report) => write!(f, "{report}"),
        }
    }
}

/// Everything planning produced before execution.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub tree: DependencyNode,
    pub plan: Plan,
    pub problems: Vec<Prerequisite>,
}

/// Plans requests and drives their jobs one at a time.
pub struct Scheduler {
    resolver: Resolver,
    injector: Injector,
    snapshot: Arc<dyn StockSnapshot>,
    tiers: Arc<dyn ToolTiers>,
    queue: Arc<dyn JobQueue>,
    assembler: Arc<dyn Assembler>,
}

impl Scheduler {
    pub fn new(
        catalog: Arc<RecipeCatalog>,
        config: &PlannerConfig,
        snapshot: Arc<dyn StockSnapshot>,
        queue: Arc<dyn JobQueue>,
        assembler: Arc<dyn Assembler>,
    ) -> Self {
        let resolver = Resolver::new(catalog.clone(), config);
        Self {
            injector: Injector::new(resolver.clone(), config),
            resolver,
            tiers: Arc::new(CatalogTiers::new(catalog, snapshot.clone())),
            snapshot,
            queue,
            assembler,
        }
    }

    /// Replaces the catalog-backed tool tier lookups.
    pub fn with_tiers(mut self, tiers: Arc<dyn ToolTiers>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Snapshot, resolve, compile and inject, without executing anything.
    pub fn prepare(&self, actor: &ActorId, resource: &ResourceId, quantity: u32) -> Prepared {
        let mut stock = self.snapshot.query(actor);
        let tree = self.resolver.resolve(resource, quantity, &mut stock);
        let mut plan = Plan::from_tree(&tree);
        info!(%actor, %resource, quantity, steps = plan.steps.len(), height = tree.height(), "Plan compiled");
        debug!(%actor, plan = %plan.describe(), "Compiled steps");

        let mut ctx = InjectionContext {
            actor,
            residual: stock,
            tiers: self.tiers.as_ref(),
        };
        let problems = self.injector.run(&mut plan, &mut ctx);
        Prepared {
            tree,
            plan,
            problems,
        }
    }

    pub async fn plan(
        &self,
        actor: &ActorId,
        resource: &ResourceId,
        quantity: u32,
    ) -> Result<PlanResult, PlannerError> {
        self.run(actor, resource, quantity, 0).await
    }

    /// Picks a request back up after its job completed.
    pub async fn resume(&self, continuation: Continuation) -> Result<PlanResult, PlannerError> {
        info!(
            actor = %continuation.owner,
            target = %continuation.target,
            hop = continuation.hop + 1,
            after = %continuation.job_summary,
            "Resuming"
        );
        self.run(
            &continuation.owner,
            &continuation.target,
            continuation.quantity,
            continuation.hop + 1,
        )
        .await
    }

    /// [`Scheduler::resume`] from a continuation stored as JSON.
    pub async fn resume_encoded(&self, encoded: &str) -> Result<PlanResult, PlannerError> {
        self.resume(Continuation::decode(encoded)?).await
    }

    /// Drops the actor's active job and its continuation. Anything already
    /// produced stays in the inventory.
    pub async fn cancel(&self, actor: &ActorId) -> Result<bool, PlannerError> {
        let cancelled = self.queue.cancel(actor).await?;
        match &cancelled {
            Some(job) => info!(%actor, job = %job.summary(), "Request cancelled"),
            None => debug!(%actor, "Nothing to cancel"),
        }
        Ok(cancelled.is_some())
    }

    async fn run(
        &self,
        actor: &ActorId,
        resource: &ResourceId,
        quantity: u32,
        hop: u32,
    ) -> Result<PlanResult, PlannerError> {
        let Prepared { plan, problems, .. } = self.prepare(actor, resource, quantity);

        if plan.blocking_shortfalls().next().is_some() || !problems.is_empty() {
            let mut report = MissingReport::new(resource.clone(), quantity)
                .labelled(self.resolver.catalog().label(resource));
            for shortfall in &plan.shortfalls {
                report.push(shortfall.clone().into());
            }
            for problem in problems {
                report.push(ReportLine::Prerequisite(problem));
            }
            warn!(%actor, %resource, quantity, lines = report.lines.len(), "Cannot plan request");
            return Ok(PlanResult::MissingIngredients(report));
        }
        self.execute(actor, plan, hop).await
    }

    /// Runs what can run now and queues the first job.
    ///
    /// A step that consumes something not coming (a gather-by-hand shortfall,
    /// a step without a job, a failed craft) is deferred, and so is every
    /// step that consumes its output. Nothing is crafted while the actor's
    /// slot is taken and the plan has a job to queue.
    pub async fn execute(&self, actor: &ActorId, plan: Plan, hop: u32) -> Result<PlanResult, PlannerError> {
        let Plan {
            target,
            quantity,
            steps,
            shortfalls,
            ..
        } = plan;
        if steps.iter().any(|step| step.job_kind().is_some()) {
            if let Some(job) = self.queue.active(actor).await? {
                warn!(%actor, job = %job.summary(), "Slot taken, nothing crafted");
                return Err(JobError::SlotBusy(format!("{actor} is already running {}", job.summary())).into());
            }
        }
        let mut report = MissingReport::new(target.clone(), quantity)
            .labelled(self.resolver.catalog().label(&target));
        let mut deferred: BTreeSet<ResourceId> = BTreeSet::new();
        for shortfall in shortfalls {
            deferred.insert(shortfall.resource.clone());
            report.push(shortfall.into());
        }

        let mut assembled = Vec::new();
        let mut remaining = Vec::new();
        let mut chosen = None;
        for step in steps {
            if chosen.is_some() {
                remaining.push(step);
                continue;
            }
            if step.consumes_any(deferred.iter()) {
                debug!(%actor, step = %step.describe(), "Deferred behind a missing input");
                deferred.insert(step.resource.clone());
                remaining.push(step);
                continue;
            }
            if !step.is_async() {
                match self.assembler.craft(actor, &step) {
                    Ok(()) => {
                        info!(%actor, step = %step.describe(), "Assembled");
                        assembled.push(step);
                    }
                    Err(e) => {
                        warn!(%actor, step = %step.describe(), error = %e, "Assembly failed");
                        deferred.insert(step.resource.clone());
                        report.push(ReportLine::AssemblyFailed {
                            step: step.clone(),
                            reason: e.to_string(),
                        });
                        remaining.push(step);
                    }
                }
                continue;
            }
            match step.job_kind() {
                Some(kind) => chosen = Some((kind, step)),
                None => {
                    warn!(%actor, step = %step.describe(), "No job runs this step");
                    deferred.insert(step.resource.clone());
                    report.push(ReportLine::JobUnavailable { step: step.clone() });
                    remaining.push(step);
                }
            }
        }

        if let Some((kind, step)) = chosen {
            let job = CraftJob::new(actor.clone(), kind, step);
            let job_summary = job.summary();
            let continuation = Continuation {
                owner: actor.clone(),
                target,
                quantity,
                job_summary: job_summary.clone(),
                remaining,
                blockers: report.lines.iter().map(ReportLine::to_string).collect(),
                hop,
            };
            let continuation_summary = continuation.render();
            let ticket = self.queue.enqueue(job, continuation).await?;
            info!(%actor, job_id = %ticket, job = %job_summary, hop, "Job queued");
            return Ok(PlanResult::Executing {
                ticket,
                job_summary,
                continuation_summary,
            });
        }
        if !report.is_empty() {
            warn!(%actor, target = %report.target, lines = report.lines.len(), "Plan stalled");
            return Ok(PlanResult::MissingIngredients(report));
        }
        if assembled.is_empty() {
            return Ok(PlanResult::Satisfied);
        }
        Ok(PlanResult::Assembled { steps: assembled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::vanilla;
    use crate::stock::MemoryInventory;
    use std::sync::Mutex;

    /// Records enqueues; refuses a second job while one is held.
    #[derive(Default)]
    struct RecordingQueue {
        jobs: Mutex<Vec<(CraftJob, Continuation)>>,
    }

    #[async_trait]
    impl JobQueue for RecordingQueue {
        async fn enqueue(&self, job: CraftJob, continuation: Continuation) -> Result<TaskId, JobError> {
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.iter().any(|(held, _)| held.owner == job.owner) {
                return Err(JobError::SlotBusy(job.owner.to_string()));
            }
            jobs.push((job, continuation));
            Ok(TaskId(jobs.len() as u64))
        }

        async fn active(&self, actor: &ActorId) -> Result<Option<CraftJob>, JobError> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().find(|(job, _)| &job.owner == actor).map(|(job, _)| job.clone()))
        }

        async fn cancel(&self, _actor: &ActorId) -> Result<Option<CraftJob>, JobError> {
            Ok(self.jobs.lock().unwrap().pop().map(|(job, _)| job))
        }
    }

    fn scheduler(inventory: &MemoryInventory) -> (Scheduler, Arc<RecordingQueue>) {
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = Scheduler::new(
            Arc::new(vanilla().unwrap()),
            &PlannerConfig::default(),
            Arc::new(inventory.clone()),
            queue.clone(),
            Arc::new(inventory.clone()),
        );
        (scheduler, queue)
    }

    #[tokio::test]
    async fn test_owned_target_is_satisfied() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        inventory.deposit(&steve, &"torch".into(), 4);
        let (scheduler, queue) = scheduler(&inventory);

        let result = scheduler.plan(&steve, &"torch".into(), 4).await.unwrap();
        assert_eq!(result, PlanResult::Satisfied);
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_only_plan_is_assembled() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        inventory.deposit(&steve, &"oak_log".into(), 1);
        let (scheduler, queue) = scheduler(&inventory);

        let result = scheduler.plan(&steve, &"stick".into(), 4).await.unwrap();
        let PlanResult::Assembled { steps } = result else {
            panic!("expected assembly, got {result:?}");
        };
        assert_eq!(steps.len(), 2);
        assert_eq!(inventory.count(&steve, &"stick".into()), 4);
        assert_eq!(inventory.count(&steve, &"oak_planks".into()), 2);
        assert_eq!(inventory.count(&steve, &"oak_log".into()), 0);
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_async_step_is_queued() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        let (scheduler, queue) = scheduler(&inventory);

        let result = scheduler.plan(&steve, &"stick".into(), 4).await.unwrap();
        let PlanResult::Executing { job_summary, continuation_summary, .. } = result else {
            panic!("expected a job, got {result:?}");
        };
        assert_eq!(job_summary, "chop 1 oak_log");
        assert_eq!(continuation_summary, "After chop 1 oak_log, assemble 2 oak_planks, 4 stick.");

        let jobs = queue.jobs.lock().unwrap();
        let (job, continuation) = &jobs[0];
        assert_eq!(job.owner, steve);
        assert_eq!(continuation.remaining.len(), 2);
        assert_eq!(continuation.hop, 0);
    }

    #[tokio::test]
    async fn test_unknown_target_is_reported() {
        let inventory = MemoryInventory::new("personal");
        let (scheduler, queue) = scheduler(&inventory);

        let result = scheduler.plan(&"steve".into(), &"elytra".into(), 1).await.unwrap();
        let PlanResult::MissingIngredients(report) = result else {
            panic!("expected a report, got {result:?}");
        };
        assert_eq!(report.to_string(), "Cannot get 1 elytra yet\n- missing 1 elytra: no known way to obtain it");
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmapped_async_step_defers_its_consumers() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        inventory.deposit(&steve, &"smoker".into(), 1);
        inventory.deposit(&steve, &"coal".into(), 1);
        inventory.deposit(&steve, &"beef".into(), 1);
        let (scheduler, queue) = scheduler(&inventory);

        let result = scheduler.plan(&steve, &"cooked_beef".into(), 1).await.unwrap();
        let PlanResult::MissingIngredients(report) = result else {
            panic!("expected a report, got {result:?}");
        };
        assert!(matches!(&report.lines[..], [ReportLine::JobUnavailable { step }] if step.resource.as_str() == "cooked_beef"));
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resume_replans_from_current_stock() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        let (scheduler, queue) = scheduler(&inventory);

        scheduler.plan(&steve, &"stick".into(), 4).await.unwrap();
        let (_, continuation) = queue.jobs.lock().unwrap().remove(0);
        inventory.deposit(&steve, &"oak_log".into(), 1);

        let encoded = continuation.encode().unwrap();
        let result = scheduler.resume_encoded(&encoded).await.unwrap();
        assert!(matches!(result, PlanResult::Assembled { .. }));
        assert_eq!(inventory.count(&steve, &"stick".into()), 4);
    }

    #[tokio::test]
    async fn test_busy_slot_leaves_inventory_alone() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        let (scheduler, queue) = scheduler(&inventory);
        scheduler.plan(&steve, &"stick".into(), 4).await.unwrap();

        // Enough logs for the planks, but the cobblestone still needs a job.
        inventory.deposit(&steve, &"oak_log".into(), 3);
        let result = scheduler.plan(&steve, &"stone_pickaxe".into(), 1).await;
        assert!(matches!(result, Err(PlannerError::Queue(JobError::SlotBusy(_)))));
        assert_eq!(inventory.count(&steve, &"oak_log".into()), 3);
        assert_eq!(inventory.count(&steve, &"oak_planks".into()), 0);
        assert_eq!(queue.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_header_uses_the_label() {
        let inventory = MemoryInventory::new("personal");
        let (scheduler, _queue) = scheduler(&inventory);

        let steve = ActorId::from("steve");
        inventory.deposit(&steve, &"smoker".into(), 1);
        inventory.deposit(&steve, &"beef".into(), 1);

        let result = scheduler.plan(&steve, &"cooked_beef".into(), 1).await.unwrap();
        let PlanResult::MissingIngredients(report) = result else {
            panic!("expected a report, got {result:?}");
        };
        assert!(report.to_string().starts_with("Cannot get 1 Steak yet"), "{report}");
    }

    #[tokio::test]
    async fn test_cancel_reports_whether_a_job_was_dropped() {
        let inventory = MemoryInventory::new("personal");
        let steve = ActorId::from("steve");
        let (scheduler, _queue) = scheduler(&inventory);

        assert!(!scheduler.cancel(&steve).await.unwrap());
        scheduler.plan(&steve, &"oak_log".into(), 2).await.unwrap();
        assert!(scheduler.cancel(&steve).await.unwrap());
    }
}
