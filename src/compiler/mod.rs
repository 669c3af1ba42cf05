//! # Plan Compiler
//!
//! Flattens a [`DependencyNode`] tree into an ordered [`Plan`].
//!
//! Nodes are emitted post-order, children before parents, one step per
//! produced node. Steps sharing `(StepType, resource)` are the same work
//! reached through different branches and are merged into the first
//! occurrence. Merging can pull a consumer ahead of a producer, so the list
//! is then re-sorted topologically (Kahn, smallest original index first),
//! which leaves an already-valid order untouched.
//!
//! Besides input edges the sort honours [`Gate`]s: a pickaxe, a station or a
//! fuel is not an input of the step it enables, but has to exist first.
//!
//! Each branch rounds up to whole runs on its own, so a merged plan can make
//! more than anything asks for. After every merge, runs nobody needs are cut,
//! walking from the last step back so a consumer shrinks before its
//! producers are looked at.

use crate::model::{Ingredient, ResourceId, Step, StepType};
use crate::resolver::{DependencyNode, NodeSource, Unresolved};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, warn};

/// A requirement the plan cannot cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub resource: ResourceId,
    pub quantity: u32,
    pub reason: Unresolved,
}

impl Shortfall {
    /// Depth-bound gaps are best effort; everything else stops execution.
    pub fn blocking(&self) -> bool {
        !matches!(self.reason, Unresolved::DepthExceeded)
    }
}

impl Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.quantity, self.resource, self.reason)
    }
}

/// The `step_type` step for `resource` runs only after every step making
/// `requires`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub requires: ResourceId,
    pub step_type: StepType,
    pub resource: ResourceId,
}

impl Gate {
    fn holds_back(&self, step: &Step) -> bool {
        step.step_type == self.step_type && step.resource == self.resource && step.resource != self.requires
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("step {consumer} needs {resource}, produced later by step {producer}")]
pub struct OrderViolation {
    pub consumer: usize,
    pub producer: usize,
    pub resource: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub target: ResourceId,
    pub quantity: u32,
    pub steps: Vec<Step>,
    pub shortfalls: Vec<Shortfall>,
    /// Owned stock the plan draws on, per resource.
    pub owned: BTreeMap<ResourceId, u32>,
    /// Output that must be left over rather than consumed: the target and
    /// injected tools, stations and fuel.
    pub kept: BTreeMap<ResourceId, u32>,
    pub gates: Vec<Gate>,
}

fn tally(ledger: &mut BTreeMap<ResourceId, u32>, resource: &ResourceId, quantity: u32) {
    if quantity > 0 {
        let entry = ledger.entry(resource.clone()).or_default();
        *entry = entry.saturating_add(quantity);
    }
}

impl Plan {
    pub fn empty(target: ResourceId, quantity: u32) -> Self {
        let mut kept = BTreeMap::new();
        tally(&mut kept, &target, quantity);
        Self {
            target,
            quantity,
            steps: Vec::new(),
            shortfalls: Vec::new(),
            owned: BTreeMap::new(),
            kept,
            gates: Vec::new(),
        }
    }

    pub fn from_tree(root: &DependencyNode) -> Self {
        let mut plan = Self::empty(root.resource.clone(), root.quantity);
        emit(root, &mut plan.steps);
        root.walk(&mut |node, _| tally(&mut plan.owned, &node.resource, node.owned_used));
        plan.add_shortfalls(root.shortfalls());
        plan.merge();
        debug!(target = %plan.target, quantity = plan.quantity, steps = plan.steps.len(), shortfalls = plan.shortfalls.len(), "Compiled plan");
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn async_steps(&self) -> Vec<&Step> {
        self.steps.iter().filter(|step| step.is_async()).collect()
    }

    pub fn craft_steps(&self) -> Vec<&Step> {
        self.steps.iter().filter(|step| !step.is_async()).collect()
    }

    pub fn blocking_shortfalls(&self) -> impl Iterator<Item = &Shortfall> {
        self.shortfalls.iter().filter(|shortfall| shortfall.blocking())
    }

    /// Puts `steps` in front, then re-merges and re-sorts.
    pub fn prepend(&mut self, steps: Vec<Step>) {
        if steps.is_empty() {
            return;
        }
        let existing = std::mem::take(&mut self.steps);
        self.steps = steps;
        self.steps.extend(existing);
        self.merge();
    }

    /// Prepends prerequisite chains in the given order, keeping each chain's
    /// target, owned stock, shortfalls and gates.
    pub fn inject(&mut self, chains: Vec<Plan>) {
        let mut steps = Vec::new();
        for chain in chains {
            for (resource, quantity) in &chain.owned {
                tally(&mut self.owned, resource, *quantity);
            }
            for (resource, quantity) in &chain.kept {
                tally(&mut self.kept, resource, *quantity);
            }
            for gate in chain.gates {
                if !self.gates.contains(&gate) {
                    self.gates.push(gate);
                }
            }
            self.add_shortfalls(chain.shortfalls);
            steps.extend(chain.steps);
        }
        self.prepend(steps);
    }

    /// Adds an ordering constraint and re-sorts if it is new.
    pub fn gate(&mut self, gate: Gate) {
        if self.gates.contains(&gate) {
            return;
        }
        self.gates.push(gate);
        let steps = std::mem::take(&mut self.steps);
        self.steps = topological(steps, &self.gates);
    }

    /// Adds shortfalls, folding same resource and reason together.
    pub fn add_shortfalls(&mut self, shortfalls: Vec<Shortfall>) {
        for shortfall in shortfalls {
            match self
                .shortfalls
                .iter_mut()
                .find(|s| s.resource == shortfall.resource && s.reason == shortfall.reason)
            {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(shortfall.quantity),
                None => self.shortfalls.push(shortfall),
            }
        }
    }

    /// Merges steps by `(StepType, resource)` into their first position,
    /// restores producer-before-consumer order and cuts unneeded runs.
    pub fn merge(&mut self) {
        let mut merged: Vec<Step> = Vec::with_capacity(self.steps.len());
        for step in std::mem::take(&mut self.steps) {
            match merged.iter_mut().find(|kept| kept.key() == step.key()) {
                Some(kept) => kept.absorb(step),
                None => merged.push(step),
            }
        }
        self.steps = topological(merged, &self.gates);
        self.trim();
    }

    /// Drops whole runs whose output nothing consumes or keeps, and caps
    /// each step's quantity at what is still asked of it.
    fn trim(&mut self) {
        for i in (0..self.steps.len()).rev() {
            let step = &self.steps[i];
            let resource = &step.resource;
            let others = u64::from(self.owned.get(resource).copied().unwrap_or(0))
                + self
                    .steps
                    .iter()
                    .enumerate()
                    .filter(|(j, s)| *j != i && &s.resource == resource)
                    .map(|(_, s)| u64::from(s.produced))
                    .sum::<u64>();
            let demand = u64::from(self.kept.get(resource).copied().unwrap_or(0))
                + self.steps.iter().map(|s| u64::from(s.consumed(resource))).sum::<u64>();
            let need = u32::try_from(demand.saturating_sub(others)).unwrap_or(u32::MAX);

            let spare = step.produced.saturating_sub(need) / step.output_per_run.max(1);
            if spare > 0 {
                let runs = step.runs.saturating_sub(spare);
                debug!(resource = %resource, from = step.runs, to = runs, "Trimming unneeded runs");
                self.steps[i].scale_runs(runs);
            }
            let step = &mut self.steps[i];
            step.quantity = step.quantity.min(need);
        }
        self.steps.retain(|step| step.runs > 0 && step.quantity > 0);
    }

    /// Total output of `resource` across all steps.
    pub fn produced(&self, resource: &ResourceId) -> u32 {
        self.steps
            .iter()
            .filter(|step| &step.resource == resource)
            .fold(0u32, |total, step| total.saturating_add(step.produced))
    }

    pub fn consumed(&self, resource: &ResourceId) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |total, step| total.saturating_add(step.consumed(resource)))
    }

    /// What the plan makes of `resource` beyond its own needs and the target.
    pub fn surplus(&self, resource: &ResourceId) -> u32 {
        let reserved = if resource == &self.target { self.quantity } else { 0 };
        self.produced(resource)
            .saturating_sub(self.consumed(resource))
            .saturating_sub(reserved)
    }

    /// Checks that no step runs before something it consumes or is gated on.
    pub fn validate_order(&self) -> Result<(), OrderViolation> {
        for (consumer, step) in self.steps.iter().enumerate() {
            let inputs = step.consumes.iter().map(|input| &input.resource);
            let gated = self
                .gates
                .iter()
                .filter(|gate| gate.holds_back(step))
                .map(|gate| &gate.requires);
            for needed in inputs.chain(gated) {
                if let Some(offset) = self.steps[consumer + 1..]
                    .iter()
                    .position(|later| &later.resource == needed)
                {
                    return Err(OrderViolation {
                        consumer,
                        producer: consumer + 1 + offset,
                        resource: needed.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// `"chop 1 oak_log, craft 4 oak_planks"`
    pub fn describe(&self) -> String {
        let parts: Vec<_> = self.steps.iter().map(Step::describe).collect();
        parts.join(", ")
    }
}

fn emit(node: &DependencyNode, steps: &mut Vec<Step>) {
    for child in &node.children {
        emit(child, steps);
    }
    if let NodeSource::Produced {
        step_type,
        runs,
        output_per_run,
        ..
    } = node.source
    {
        steps.push(Step {
            step_type,
            resource: node.resource.clone(),
            quantity: node.deficit(),
            runs,
            output_per_run,
            produced: runs.saturating_mul(output_per_run),
            consumes: node
                .children
                .iter()
                .map(|child| Ingredient::new(child.resource.clone(), child.quantity))
                .collect(),
        });
    }
}

/// Stable Kahn sort over producer -> consumer and gate edges.
fn topological(steps: Vec<Step>, gates: &[Gate]) -> Vec<Step> {
    let mut producers: HashMap<&ResourceId, Vec<usize>> = HashMap::new();
    for (i, step) in steps.iter().enumerate() {
        producers.entry(&step.resource).or_default().push(i);
    }

    let mut in_degree = vec![0usize; steps.len()];
    let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];
    for (j, step) in steps.iter().enumerate() {
        let inputs = step.consumes.iter().map(|input| &input.resource);
        let gated = gates
            .iter()
            .filter(|gate| gate.holds_back(step))
            .map(|gate| &gate.requires);
        for needed in inputs.chain(gated) {
            for &i in producers.get(needed).into_iter().flatten() {
                if i != j && !consumers[i].contains(&j) {
                    consumers[i].push(j);
                    in_degree[j] += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..steps.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(steps.len());
    while let Some(current) = ready.pop_first() {
        order.push(current);
        for &next in &consumers[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() < steps.len() {
        // Merged branches produce each other; keep the rest in emission order.
        let stuck: Vec<usize> = (0..steps.len()).filter(|i| !order.contains(i)).collect();
        warn!(steps = stuck.len(), "Plan contains a production loop");
        order.extend(stuck);
    }

    let mut slots: Vec<Option<Step>> = steps.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepType;

    fn step(step_type: StepType, resource: &str, quantity: u32, consumes: &[(&str, u32)]) -> Step {
        Step {
            step_type,
            resource: resource.into(),
            quantity,
            runs: quantity,
            output_per_run: 1,
            produced: quantity,
            consumes: consumes
                .iter()
                .map(|(r, q)| Ingredient::new(*r, *q))
                .collect(),
        }
    }

    fn produced(resource: &str, step_type: StepType, runs: u32, per_run: u32, children: Vec<DependencyNode>) -> DependencyNode {
        DependencyNode {
            resource: resource.into(),
            quantity: runs * per_run,
            owned_used: 0,
            source: NodeSource::Produced {
                method: crate::model::MethodId(0),
                step_type,
                runs,
                output_per_run: per_run,
            },
            children,
        }
    }

    #[test]
    fn test_post_order_emission() {
        // target <- 2 x, 1 y ; x <- 1 r
        let r = produced("r", StepType::Gather, 2, 1, vec![]);
        let x = produced("x", StepType::Craft, 2, 1, vec![r]);
        let y = produced("y", StepType::Mine, 1, 1, vec![]);
        let root = produced("target", StepType::Craft, 1, 1, vec![x, y]);

        let plan = Plan::from_tree(&root);
        let order: Vec<_> = plan.steps.iter().map(|s| s.resource.as_str()).collect();
        assert_eq!(order, vec!["r", "x", "y", "target"]);
        assert_eq!(plan.async_steps().len(), 2);
        assert_eq!(plan.craft_steps().len(), 2);
        assert_eq!(plan.steps[3].consumed(&"x".into()), 2);
        assert!(plan.validate_order().is_ok());
    }

    #[test]
    fn test_available_leaves_emit_nothing() {
        let root = DependencyNode::available("stick".into(), 4);
        let plan = Plan::from_tree(&root);
        assert!(plan.is_empty());
        assert!(plan.shortfalls.is_empty());
    }

    #[test]
    fn test_merge_sums_and_keeps_first_position() {
        let mut plan = Plan::empty("torch".into(), 4);
        plan.steps = vec![
            step(StepType::Chop, "oak_log", 1, &[]),
            step(StepType::Craft, "stick", 4, &[("oak_log", 3)]),
            step(StepType::Chop, "oak_log", 2, &[]),
            step(StepType::Craft, "torch", 4, &[("stick", 4)]),
        ];
        plan.merge();
        let order: Vec<_> = plan.steps.iter().map(|s| s.describe()).collect();
        assert_eq!(order, vec!["chop 3 oak_log", "craft 4 stick", "craft 4 torch"]);
    }

    #[test]
    fn test_merge_restores_producer_order() {
        // The second branch needs coal before the first branch's coal step.
        let mut plan = Plan::empty("lantern".into(), 1);
        plan.steps = vec![
            step(StepType::Craft, "torch", 1, &[("coal", 1)]),
            step(StepType::Mine, "coal", 1, &[]),
            step(StepType::Craft, "lantern", 1, &[("torch", 1)]),
        ];
        assert!(matches!(
            plan.validate_order(),
            Err(OrderViolation { consumer: 0, producer: 1, .. })
        ));
        plan.merge();
        let order: Vec<_> = plan.steps.iter().map(|s| s.resource.as_str()).collect();
        assert_eq!(order, vec!["coal", "torch", "lantern"]);
        assert!(plan.validate_order().is_ok());
    }

    #[test]
    fn test_inject_merges_with_existing() {
        let mut plan = Plan::empty("iron_ingot".into(), 1);
        plan.steps = vec![
            step(StepType::Mine, "raw_iron", 1, &[]),
            step(StepType::Smelt, "iron_ingot", 1, &[("raw_iron", 1)]),
        ];
        let mut coal = Plan::empty("coal".into(), 1);
        coal.steps = vec![step(StepType::Mine, "coal", 1, &[])];
        let mut iron = Plan::empty("raw_iron".into(), 2);
        iron.steps = vec![step(StepType::Mine, "raw_iron", 2, &[])];

        plan.inject(vec![coal, iron]);
        let order: Vec<_> = plan.steps.iter().map(|s| s.describe()).collect();
        assert_eq!(order, vec!["mine 1 coal", "mine 3 raw_iron", "smelt 1 iron_ingot"]);
        assert_eq!(plan.kept.get(&ResourceId::from("coal")), Some(&1));
    }

    #[test]
    fn test_merge_cuts_runs_nobody_needs() {
        // Two branches each rounded sticks up to a full run of four.
        let mut plan = Plan::empty("ladder".into(), 1);
        let sticks = |quantity| Step {
            runs: 1,
            output_per_run: 4,
            produced: 4,
            ..step(StepType::Craft, "stick", quantity, &[("oak_planks", 2)])
        };
        plan.steps = vec![
            step(StepType::Chop, "oak_log", 1, &[]),
            Step {
                runs: 1,
                output_per_run: 4,
                produced: 4,
                ..step(StepType::Craft, "oak_planks", 4, &[("oak_log", 1)])
            },
            sticks(2),
            sticks(1),
            step(StepType::Craft, "ladder", 1, &[("stick", 3)]),
        ];
        plan.merge();
        let order: Vec<_> = plan.steps.iter().map(|s| s.describe()).collect();
        assert_eq!(order, vec!["chop 1 oak_log", "craft 2 oak_planks", "craft 3 stick", "craft 1 ladder"]);
        assert_eq!(plan.steps[2].runs, 1);
        assert_eq!(plan.steps[2].consumed(&"oak_planks".into()), 2);
    }

    #[test]
    fn test_owned_stock_replaces_production() {
        let mut plan = Plan::empty("stick".into(), 4);
        plan.owned.insert("oak_log".into(), 1);
        plan.steps = vec![
            step(StepType::Chop, "oak_log", 1, &[]),
            step(StepType::Craft, "stick", 4, &[("oak_log", 1)]),
        ];
        plan.merge();
        assert_eq!(plan.describe(), "craft 4 stick");
    }

    #[test]
    fn test_gates_order_unrelated_steps() {
        let mut plan = Plan::empty("furnace".into(), 1);
        plan.steps = vec![
            step(StepType::Mine, "cobblestone", 8, &[]),
            step(StepType::Craft, "furnace", 1, &[("cobblestone", 8)]),
            step(StepType::Chop, "oak_log", 1, &[]),
            step(StepType::Craft, "wooden_pickaxe", 1, &[("oak_log", 1)]),
        ];
        plan.kept.insert("wooden_pickaxe".into(), 1);
        plan.merge();
        assert_eq!(plan.steps[0].resource.as_str(), "cobblestone");

        let gate = Gate {
            requires: "wooden_pickaxe".into(),
            step_type: StepType::Mine,
            resource: "cobblestone".into(),
        };
        plan.gates.push(gate.clone());
        assert!(matches!(
            plan.validate_order(),
            Err(OrderViolation { consumer: 0, producer: 3, .. })
        ));
        plan.gates.clear();
        plan.gate(gate.clone());
        plan.gate(gate);
        assert_eq!(plan.gates.len(), 1);
        let order: Vec<_> = plan.steps.iter().map(|s| s.resource.as_str()).collect();
        assert_eq!(order, vec!["oak_log", "wooden_pickaxe", "cobblestone", "furnace"]);
        assert!(plan.validate_order().is_ok());
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let runs = u32::MAX / 4 + 1;
        let node = DependencyNode {
            quantity: u32::MAX,
            source: NodeSource::Produced {
                method: crate::model::MethodId(0),
                step_type: StepType::Craft,
                runs,
                output_per_run: 4,
            },
            ..produced("stick", StepType::Craft, runs, 1, vec![])
        };
        let plan = Plan::from_tree(&node);
        assert_eq!(plan.steps[0].produced, u32::MAX);
        assert_eq!(plan.produced(&"stick".into()), u32::MAX);
    }

    #[test]
    fn test_surplus_excludes_target_and_consumption() {
        let mut plan = Plan::empty("coal".into(), 2);
        plan.steps = vec![
            Step {
                produced: 5,
                ..step(StepType::Mine, "coal", 5, &[])
            },
            step(StepType::Craft, "torch", 4, &[("coal", 1)]),
        ];
        assert_eq!(plan.surplus(&"coal".into()), 2);
        assert_eq!(plan.surplus(&"torch".into()), 4);
    }

    #[test]
    fn test_shortfalls_fold_and_classify() {
        let mut plan = Plan::empty("x".into(), 1);
        plan.add_shortfalls(vec![
            Shortfall { resource: "a".into(), quantity: 1, reason: Unresolved::NoMethod },
            Shortfall { resource: "a".into(), quantity: 2, reason: Unresolved::NoMethod },
            Shortfall { resource: "b".into(), quantity: 1, reason: Unresolved::DepthExceeded },
        ]);
        assert_eq!(plan.shortfalls.len(), 2);
        assert_eq!(plan.shortfalls[0].quantity, 3);
        assert_eq!(plan.blocking_shortfalls().count(), 1);
    }
}
