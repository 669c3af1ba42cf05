use craft_planner::catalog::vanilla;
use craft_planner::clients::JobClient;
use craft_planner::config::PlannerConfig;
use craft_planner::error::PlannerError;
use craft_planner::job::{CraftJob, JobError};
use craft_planner::model::{ActorId, JobKind, Step, StepType};
use craft_planner::scheduler::{PlanResult, Scheduler};
use craft_planner::stock::MemoryInventory;
use job_slot::mock::MockSlot;
use job_slot::{FrameworkError, TaskId};
use std::sync::Arc;

fn scheduler(mock: &MockSlot<CraftJob>, inventory: &MemoryInventory) -> Scheduler {
    Scheduler::new(
        Arc::new(vanilla().unwrap()),
        &PlannerConfig::default(),
        Arc::new(inventory.clone()),
        Arc::new(JobClient::new(mock.client())),
        Arc::new(inventory.clone()),
    )
}

/// Real planner against a scripted slot: checks exactly what gets enqueued.
#[tokio::test]
async fn test_planner_enqueues_first_job_with_continuation() {
    let mut mock = MockSlot::<CraftJob>::new();
    mock.expect_active().return_ok(None);
    mock.expect_enqueue().return_ok(TaskId(42));

    let inventory = MemoryInventory::new("personal");
    let steve = ActorId::from("steve");
    inventory.deposit(&steve, &"stick".into(), 2);
    inventory.deposit(&steve, &"wooden_pickaxe".into(), 1);
    let scheduler = scheduler(&mock, &inventory);

    let result = scheduler.plan(&steve, &"stone_pickaxe".into(), 1).await.unwrap();
    let PlanResult::Executing { ticket, job_summary, .. } = result else {
        panic!("expected a job, got {result:?}");
    };
    assert_eq!(ticket, TaskId(42));
    assert_eq!(job_summary, "mine 3 cobblestone");

    let enqueued = mock.enqueued();
    assert_eq!(enqueued.len(), 1);
    let (job, continuation) = &enqueued[0];
    assert_eq!(job.kind, JobKind::Mine);
    assert_eq!(job.owner, steve);
    let continuation = continuation.as_ref().expect("continuation attached");
    assert_eq!(continuation.target.as_str(), "stone_pickaxe");
    assert_eq!(continuation.remaining.len(), 1);
    assert_eq!(continuation.render(), "After mine 3 cobblestone, assemble 1 stone_pickaxe.");
    mock.verify();
}

#[tokio::test]
async fn test_queue_failures_surface_as_errors() {
    let mut mock = MockSlot::<CraftJob>::new();
    mock.expect_active().return_ok(None);
    mock.expect_enqueue().return_err(FrameworkError::ActorClosed);
    mock.expect_cancel().return_err(FrameworkError::ActorDropped);

    let inventory = MemoryInventory::new("personal");
    let scheduler = scheduler(&mock, &inventory);
    let steve = ActorId::from("steve");

    let result = scheduler.plan(&steve, &"oak_log".into(), 1).await;
    assert!(matches!(result, Err(PlannerError::Queue(JobError::ActorCommunicationError(_)))));
    let result = scheduler.cancel(&steve).await;
    assert!(matches!(result, Err(PlannerError::Queue(_))));
    mock.verify();
}

#[tokio::test]
async fn test_taken_slot_stops_before_any_craft() {
    let mut mock = MockSlot::<CraftJob>::new();
    let held = CraftJob::new(
        "steve".into(),
        JobKind::Chop,
        Step {
            step_type: StepType::Chop,
            resource: "birch_log".into(),
            quantity: 1,
            runs: 1,
            output_per_run: 1,
            produced: 1,
            consumes: vec![],
        },
    );
    mock.expect_active().return_ok(Some((TaskId(7), held)));

    let inventory = MemoryInventory::new("personal");
    let steve = ActorId::from("steve");
    inventory.deposit(&steve, &"oak_log".into(), 3);
    let scheduler = scheduler(&mock, &inventory);

    let result = scheduler.plan(&steve, &"stone_pickaxe".into(), 1).await;
    assert!(matches!(result, Err(PlannerError::Queue(JobError::SlotBusy(_)))));
    assert_eq!(inventory.count(&steve, &"oak_log".into()), 3);
    assert_eq!(inventory.count(&steve, &"stick".into()), 0);
    assert!(mock.enqueued().is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_reports_never_touch_the_queue() {
    let mock = MockSlot::<CraftJob>::new();
    let inventory = MemoryInventory::new("personal");
    let scheduler = scheduler(&mock, &inventory);

    // No expectations scripted: any request would panic the mock.
    let result = scheduler.plan(&"steve".into(), &"netherite_ingot".into(), 1).await.unwrap();
    assert!(matches!(result, PlanResult::MissingIngredients(_)));
    assert!(mock.enqueued().is_empty());
    mock.verify();
}
