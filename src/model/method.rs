//! Production methods: how inputs turn into an output.

use super::resource::ResourceId;
use super::step::StepType;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A concrete resource/quantity pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub resource: ResourceId,
    pub quantity: u32,
}

impl Ingredient {
    pub fn new(resource: impl Into<ResourceId>, quantity: u32) -> Self {
        Self {
            resource: resource.into(),
            quantity,
        }
    }
}

/// One input position of a method.
///
/// A slot is a capability set: any listed variant satisfies it. Variants are
/// ordered; the first is the preferred one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSlot {
    pub variants: Vec<ResourceId>,
    pub quantity: u32,
}

impl InputSlot {
    pub fn single(resource: impl Into<ResourceId>, quantity: u32) -> Self {
        Self {
            variants: vec![resource.into()],
            quantity,
        }
    }

    pub fn any_of<I, R>(variants: I, quantity: u32) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceId>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
            quantity,
        }
    }

    pub fn accepts(&self, resource: &ResourceId) -> bool {
        self.variants.contains(resource)
    }
}

/// Index of a method in catalog order. Lower ids win ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(pub usize);

impl Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "method_{}", self.0)
    }
}

/// A recipe-like transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionMethod {
    pub id: MethodId,
    pub output: ResourceId,
    pub output_quantity: u32,
    pub step_type: StepType,
    pub inputs: Vec<InputSlot>,
    /// Canonical method for its output when none is satisfiable from stock.
    pub default: bool,
}

impl ProductionMethod {
    /// Executions needed to cover `deficit`.
    pub fn runs_for(&self, deficit: u32) -> u32 {
        deficit.div_ceil(self.output_quantity.max(1))
    }

    /// True if every slot has a variant with at least `runs * quantity` owned.
    pub fn satisfiable_with(&self, runs: u32, available: impl Fn(&ResourceId) -> u32) -> bool {
        self.inputs.iter().all(|slot| {
            let needed = runs.saturating_mul(slot.quantity);
            slot.variants.iter().any(|variant| available(variant) >= needed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sticks() -> ProductionMethod {
        ProductionMethod {
            id: MethodId(0),
            output: "stick".into(),
            output_quantity: 4,
            step_type: StepType::Craft,
            inputs: vec![InputSlot::any_of(["oak_planks", "birch_planks"], 2)],
            default: true,
        }
    }

    #[test]
    fn test_runs_round_up() {
        let method = sticks();
        assert_eq!(method.runs_for(1), 1);
        assert_eq!(method.runs_for(4), 1);
        assert_eq!(method.runs_for(5), 2);
        assert_eq!(method.runs_for(0), 0);
    }

    #[test]
    fn test_satisfiable_with_any_variant() {
        let method = sticks();
        let birch_only = |r: &ResourceId| if r.as_str() == "birch_planks" { 4 } else { 0 };
        assert!(method.satisfiable_with(2, birch_only));
        assert!(!method.satisfiable_with(3, birch_only));
    }

    #[test]
    fn test_slot_accepts_variants() {
        let slot = InputSlot::any_of(["oak_planks", "birch_planks"], 1);
        assert!(slot.accepts(&"birch_planks".into()));
        assert!(!slot.accepts(&"stone".into()));
    }
}
