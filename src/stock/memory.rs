use super::{InventorySource, Stock, StockSnapshot};
use crate::model::{ActorId, ResourceId, Step};
use crate::scheduler::{Assembler, AssemblyError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Shelves = HashMap<ActorId, BTreeMap<ResourceId, u32>>;

/// Shared in-memory inventory, keyed by actor.
///
/// Clones share the same storage, so a job runner can deposit outputs into
/// the very inventory the planner snapshots.
#[derive(Debug, Clone)]
pub struct MemoryInventory {
    label: String,
    shelves: Arc<Mutex<Shelves>>,
}

impl MemoryInventory {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shelves: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn shelves(&self) -> MutexGuard<'_, Shelves> {
        self.shelves.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn deposit(&self, actor: &ActorId, resource: &ResourceId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let mut shelves = self.shelves();
        let count = shelves
            .entry(actor.clone())
            .or_default()
            .entry(resource.clone())
            .or_default();
        *count = count.saturating_add(quantity);
    }

    /// Removes `quantity` only if all of it is there.
    pub fn withdraw(&self, actor: &ActorId, resource: &ResourceId, quantity: u32) -> bool {
        let mut shelves = self.shelves();
        let Some(count) = shelves.get_mut(actor).and_then(|shelf| shelf.get_mut(resource)) else {
            return quantity == 0;
        };
        if *count < quantity {
            return false;
        }
        *count -= quantity;
        true
    }

    pub fn count(&self, actor: &ActorId, resource: &ResourceId) -> u32 {
        self.shelves()
            .get(actor)
            .and_then(|shelf| shelf.get(resource))
            .copied()
            .unwrap_or(0)
    }
}

impl InventorySource for MemoryInventory {
    fn label(&self) -> &str {
        &self.label
    }

    fn contents(&self, actor: &ActorId) -> Stock {
        let shelves = self.shelves();
        let shelf = shelves.get(actor).into_iter().flatten();
        Stock::from_counts(shelf.map(|(resource, &quantity)| (resource.clone(), quantity)))
    }
}

impl StockSnapshot for MemoryInventory {
    fn query(&self, actor: &ActorId) -> Stock {
        self.contents(actor)
    }
}

impl Assembler for MemoryInventory {
    /// Checks every input first, then consumes them all and stores the output.
    fn craft(&self, actor: &ActorId, step: &Step) -> Result<(), AssemblyError> {
        let mut shelves = self.shelves();
        let shelf = shelves.entry(actor.clone()).or_default();

        for input in &step.consumes {
            let have = shelf.get(&input.resource).copied().unwrap_or(0);
            if have < input.quantity {
                return Err(AssemblyError::Missing {
                    resource: input.resource.clone(),
                    quantity: input.quantity - have,
                });
            }
        }
        for input in &step.consumes {
            if let Some(count) = shelf.get_mut(&input.resource) {
                *count -= input.quantity;
            }
        }
        let output = shelf.entry(step.resource.clone()).or_default();
        *output = output.saturating_add(step.produced);

        debug!(%actor, resource = %step.resource, quantity = step.produced, "Assembled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, StepType};

    fn sticks(runs: u32) -> Step {
        Step {
            step_type: StepType::Craft,
            resource: "stick".into(),
            quantity: runs * 4,
            runs,
            output_per_run: 4,
            produced: runs * 4,
            consumes: vec![Ingredient::new("oak_planks", runs * 2)],
        }
    }

    #[test]
    fn test_craft_consumes_and_produces() {
        let steve = ActorId::from("steve");
        let inventory = MemoryInventory::new("personal");
        inventory.deposit(&steve, &"oak_planks".into(), 5);

        inventory.craft(&steve, &sticks(2)).unwrap();
        assert_eq!(inventory.count(&steve, &"oak_planks".into()), 1);
        assert_eq!(inventory.count(&steve, &"stick".into()), 8);
    }

    #[test]
    fn test_craft_refuses_without_touching_stock() {
        let steve = ActorId::from("steve");
        let inventory = MemoryInventory::new("personal");
        inventory.deposit(&steve, &"oak_planks".into(), 3);

        let result = inventory.craft(&steve, &sticks(2));
        assert!(matches!(
            result,
            Err(AssemblyError::Missing { quantity: 1, .. })
        ));
        assert_eq!(inventory.count(&steve, &"oak_planks".into()), 3);
        assert_eq!(inventory.count(&steve, &"stick".into()), 0);
    }

    #[test]
    fn test_withdraw_is_all_or_nothing() {
        let steve = ActorId::from("steve");
        let inventory = MemoryInventory::new("personal");
        inventory.deposit(&steve, &"coal".into(), 2);
        assert!(!inventory.withdraw(&steve, &"coal".into(), 3));
        assert!(inventory.withdraw(&steve, &"coal".into(), 2));
        assert_eq!(inventory.query(&steve).available(&"coal".into()), 0);
    }
}
