use craft_planner::catalog::vanilla;
use craft_planner::config::PlannerConfig;
use craft_planner::error::PlannerError;
use craft_planner::lifecycle::CraftingSystem;
use craft_planner::model::ActorId;
use craft_planner::scheduler::PlanResult;
use craft_planner::stock::MemoryInventory;
use job_slot::tracing::setup_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    setup_tracing();

    if let Err(e) = run().await {
        error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PlannerError> {
    let config = PlannerConfig::from_env()?;
    let catalog = Arc::new(vanilla()?);
    let inventory = MemoryInventory::new("personal");
    let steve = ActorId::from("steve");
    inventory.deposit(&steve, &"oak_log".into(), 2);

    let mut system = CraftingSystem::new(catalog, &config, inventory);

    info!("--- Request: 1 stone_pickaxe ---");
    let result = system.plan(&steve, &"stone_pickaxe".into(), 1).await?;
    info!("{result}");
    if matches!(result, PlanResult::Executing { .. }) {
        while let Some(hop) = system.next_outcome().await {
            let result = hop.result?;
            info!(finished = %hop.finished, "{result}");
            if !matches!(result, PlanResult::Executing { .. }) {
                break;
            }
        }
    }
    info!(
        stone_pickaxe = system.inventory.count(&steve, &"stone_pickaxe".into()),
        wooden_pickaxe = system.inventory.count(&steve, &"wooden_pickaxe".into()),
        "Inventory"
    );

    info!("--- Request: 3 cooked_beef ---");
    let result = system.run_to_completion(&steve, &"cooked_beef".into(), 3).await?;
    info!("{result}");

    info!("--- Request: 1 diamond_pickaxe ---");
    let result = system.run_to_completion(&steve, &"diamond_pickaxe".into(), 1).await?;
    info!("{result}");

    if let Err(e) = system.shutdown().await {
        error!("Shutdown failed: {e}");
    }
    Ok(())
}
