//! Step types and the flattened unit of planned work.

use super::method::Ingredient;
use super::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Heat-processing station families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatKind {
    Furnace,
    BlastFurnace,
    Smoker,
    Campfire,
}

impl HeatKind {
    /// Campfires burn on their own.
    pub fn needs_fuel(self) -> bool {
        !matches!(self, Self::Campfire)
    }
}

impl Display for HeatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Furnace => "furnace",
            Self::BlastFurnace => "blast furnace",
            Self::Smoker => "smoker",
            Self::Campfire => "campfire",
        };
        f.write_str(name)
    }
}

/// How a resource is obtained.
///
/// `Available` marks a requirement already satisfied by owned stock; it never
/// appears in a compiled plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Available,
    Craft,
    Smelt,
    Blast,
    Smoke,
    CampfireCook,
    Gather,
    Mine,
    Chop,
    Farm,
    Fish,
    KillMob,
}

impl StepType {
    /// The station family a heat-processing step needs, if any.
    pub fn heat_kind(self) -> Option<HeatKind> {
        match self {
            Self::Smelt => Some(HeatKind::Furnace),
            Self::Blast => Some(HeatKind::BlastFurnace),
            Self::Smoke => Some(HeatKind::Smoker),
            Self::CampfireCook => Some(HeatKind::Campfire),
            _ => None,
        }
    }

    /// Async steps need travel or elapsed time and run as jobs; sync steps
    /// complete instantly against current stock.
    pub fn is_async(self) -> bool {
        !matches!(self, Self::Available | Self::Craft)
    }

    /// Direct job mapping. Compound heat steps have none.
    pub fn job_kind(self) -> Option<JobKind> {
        match self {
            Self::Gather => Some(JobKind::Gather),
            Self::Mine => Some(JobKind::Mine),
            Self::Chop => Some(JobKind::Chop),
            Self::Farm => Some(JobKind::Farm),
            Self::Fish => Some(JobKind::Fish),
            Self::KillMob => Some(JobKind::Hunt),
            Self::Smelt => Some(JobKind::Smelt),
            Self::Available
            | Self::Craft
            | Self::Blast
            | Self::Smoke
            | Self::CampfireCook => None,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Available => "use",
            Self::Craft => "craft",
            Self::Smelt => "smelt",
            Self::Blast => "blast",
            Self::Smoke => "smoke",
            Self::CampfireCook => "cook",
            Self::Gather => "gather",
            Self::Mine => "mine",
            Self::Chop => "chop",
            Self::Farm => "farm",
            Self::Fish => "fish",
            Self::KillMob => "hunt",
        }
    }
}

impl Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Long-running job kinds the actor's task queue knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Gather,
    Mine,
    Chop,
    Farm,
    Fish,
    Hunt,
    Smelt,
}

impl Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gather => "gather",
            Self::Mine => "mine",
            Self::Chop => "chop",
            Self::Farm => "farm",
            Self::Fish => "fish",
            Self::Hunt => "hunt",
            Self::Smelt => "smelt",
        };
        f.write_str(name)
    }
}

/// One flattened unit of work.
///
/// `quantity` is what the plan needs; `produced` is what `runs` executions of
/// the chosen method yield (`runs * output_per_run`, never less than
/// `quantity`). `consumes` lists the concrete input variants at
/// `runs * slot quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_type: StepType,
    pub resource: ResourceId,
    pub quantity: u32,
    pub runs: u32,
    #[serde(default = "single_output")]
    pub output_per_run: u32,
    pub produced: u32,
    #[serde(default)]
    pub consumes: Vec<Ingredient>,
}

fn single_output() -> u32 {
    1
}

impl Step {
    pub fn is_async(&self) -> bool {
        self.step_type.is_async()
    }

    pub fn job_kind(&self) -> Option<JobKind> {
        self.step_type.job_kind()
    }

    /// Merge key: steps sharing it are the same work.
    pub fn key(&self) -> (StepType, &ResourceId) {
        (self.step_type, &self.resource)
    }

    /// How much of `resource` this step uses up.
    pub fn consumed(&self, resource: &ResourceId) -> u32 {
        self.consumes
            .iter()
            .filter(|ingredient| &ingredient.resource == resource)
            .fold(0u32, |total, ingredient| total.saturating_add(ingredient.quantity))
    }

    pub fn consumes_any<'a>(&self, mut resources: impl Iterator<Item = &'a ResourceId>) -> bool {
        resources.any(|resource| self.consumed(resource) > 0)
    }

    /// Fold another step with the same key into this one.
    ///
    /// Both sides were rounded up to whole runs on their own, so the merged
    /// step is re-rounded from the summed quantity and `other` only adds the
    /// runs that are still missing, with its inputs scaled to match.
    pub fn absorb(&mut self, mut other: Step) {
        debug_assert_eq!(self.step_type, other.step_type);
        debug_assert_eq!(self.resource, other.resource);
        let per_run = self.output_per_run.max(1);
        self.quantity = self.quantity.saturating_add(other.quantity);
        let runs = self.quantity.div_ceil(per_run).max(self.runs);
        other.scale_runs(runs - self.runs);
        self.runs = runs;
        self.produced = runs.saturating_mul(per_run);
        for ingredient in other.consumes {
            match self
                .consumes
                .iter_mut()
                .find(|existing| existing.resource == ingredient.resource)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(ingredient.quantity)
                }
                None => self.consumes.push(ingredient),
            }
        }
        self.consumes.retain(|ingredient| ingredient.quantity > 0);
    }

    /// Cuts the step down to `runs` executions. Inputs shrink in proportion,
    /// and `quantity` never exceeds what is still produced.
    pub fn scale_runs(&mut self, runs: u32) {
        let before = self.runs;
        if runs >= before {
            return;
        }
        for ingredient in &mut self.consumes {
            let scaled = (u64::from(ingredient.quantity) * u64::from(runs)).div_ceil(u64::from(before));
            ingredient.quantity = u32::try_from(scaled).unwrap_or(u32::MAX);
        }
        self.consumes.retain(|ingredient| ingredient.quantity > 0);
        self.runs = runs;
        self.produced = runs.saturating_mul(self.output_per_run.max(1));
        self.quantity = self.quantity.min(self.produced);
    }

    /// `"chop 3 oak_log"`
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.step_type, self.quantity, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(step_type: StepType, resource: &str, quantity: u32) -> Step {
        Step {
            step_type,
            resource: resource.into(),
            quantity,
            runs: quantity,
            output_per_run: 1,
            produced: quantity,
            consumes: vec![],
        }
    }

    fn sticks(quantity: u32, planks: &str) -> Step {
        let runs = quantity.div_ceil(4);
        Step {
            step_type: StepType::Craft,
            resource: "stick".into(),
            quantity,
            runs,
            output_per_run: 4,
            produced: runs * 4,
            consumes: vec![Ingredient::new(planks, runs * 2)],
        }
    }

    #[test]
    fn test_async_partition() {
        assert!(!StepType::Craft.is_async());
        assert!(!StepType::Available.is_async());
        for t in [
            StepType::Chop,
            StepType::Mine,
            StepType::Gather,
            StepType::Smelt,
            StepType::Blast,
            StepType::Farm,
            StepType::Fish,
            StepType::KillMob,
        ] {
            assert!(t.is_async(), "{t:?} should be async");
        }
    }

    #[test]
    fn test_compound_heat_steps_have_no_job() {
        assert_eq!(StepType::Smelt.job_kind(), Some(JobKind::Smelt));
        assert_eq!(StepType::Blast.job_kind(), None);
        assert_eq!(StepType::Smoke.job_kind(), None);
        assert_eq!(StepType::CampfireCook.job_kind(), None);
        assert_eq!(StepType::KillMob.job_kind(), Some(JobKind::Hunt));
        assert_eq!(StepType::Blast.heat_kind(), Some(HeatKind::BlastFurnace));
    }

    #[test]
    fn test_absorb_sums_quantities_and_inputs() {
        let mut a = step(StepType::Craft, "stick", 4);
        a.consumes = vec![Ingredient::new("oak_planks", 2)];
        let mut b = step(StepType::Craft, "stick", 4);
        b.consumes = vec![
            Ingredient::new("oak_planks", 2),
            Ingredient::new("bamboo", 1),
        ];

        a.absorb(b);
        assert_eq!(a.quantity, 8);
        assert_eq!(a.runs, 8);
        assert_eq!(a.consumed(&"oak_planks".into()), 4);
        assert_eq!(a.consumed(&"bamboo".into()), 1);
    }

    #[test]
    fn test_absorb_rounds_the_merged_quantity_once() {
        // 2 + 2 sticks fit in one run of 4.
        let mut a = sticks(2, "oak_planks");
        a.absorb(sticks(2, "oak_planks"));
        assert_eq!((a.quantity, a.runs, a.produced), (4, 1, 4));
        assert_eq!(a.consumed(&"oak_planks".into()), 2);

        // 3 + 3 need two runs; the second branch's variant supplies the extra one.
        let mut b = sticks(3, "oak_planks");
        b.absorb(sticks(3, "birch_planks"));
        assert_eq!((b.quantity, b.runs, b.produced), (6, 2, 8));
        assert_eq!(b.consumed(&"oak_planks".into()), 2);
        assert_eq!(b.consumed(&"birch_planks".into()), 2);
    }

    #[test]
    fn test_scale_runs_shrinks_inputs_and_output() {
        let mut s = sticks(12, "oak_planks");
        s.scale_runs(1);
        assert_eq!((s.quantity, s.runs, s.produced), (4, 1, 4));
        assert_eq!(s.consumed(&"oak_planks".into()), 2);
        s.scale_runs(0);
        assert!(s.consumes.is_empty());
        assert_eq!(s.produced, 0);
    }

    #[test]
    fn test_absorb_saturates_instead_of_overflowing() {
        let mut a = step(StepType::Chop, "oak_log", u32::MAX);
        a.absorb(step(StepType::Chop, "oak_log", 5));
        assert_eq!(a.quantity, u32::MAX);
        assert_eq!(a.runs, u32::MAX);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&StepType::KillMob).unwrap();
        assert_eq!(json, "\"kill_mob\"");
        let parsed: StepType = serde_json::from_str("\"campfire_cook\"").unwrap();
        assert_eq!(parsed, StepType::CampfireCook);
    }
}
