use crate::model::{ActorId, ResourceId, Step};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContinuationError {
    #[error("Malformed continuation: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What to do once the queued job completes.
///
/// The structured contract is `owner`, `target`, `quantity` and `remaining`.
/// [`Continuation::render`] turns it into the sentence relayed to players and
/// is never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    pub owner: ActorId,
    pub target: ResourceId,
    pub quantity: u32,
    /// Summary of the job this continuation is attached to.
    pub job_summary: String,
    /// Every step not yet done, in plan order.
    pub remaining: Vec<Step>,
    /// What the queued work cannot fix on its own, already rendered.
    #[serde(default)]
    pub blockers: Vec<String>,
    /// How many completed jobs led here.
    pub hop: u32,
}

impl Continuation {
    pub fn encode(&self) -> Result<String, ContinuationError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(encoded: &str) -> Result<Self, ContinuationError> {
        Ok(serde_json::from_str(encoded)?)
    }

    pub fn pending_jobs(&self) -> impl Iterator<Item = &Step> {
        self.remaining.iter().filter(|step| step.is_async())
    }

    pub fn final_assembly(&self) -> impl Iterator<Item = &Step> {
        self.remaining.iter().filter(|step| !step.is_async())
    }

    /// `"After chop 1 oak_log, next: mine 3 cobblestone; finally assemble 1 furnace."`
    ///
    /// Blockers follow as `" Still needed: gather 1 sand by hand."`
    pub fn render(&self) -> String {
        let jobs: Vec<_> = self.pending_jobs().map(Step::describe).collect();
        let crafts: Vec<_> = self
            .final_assembly()
            .map(|step| format!("{} {}", step.quantity, step.resource))
            .collect();

        let mut sentence = format!("After {}", self.job_summary);
        match (jobs.is_empty(), crafts.is_empty()) {
            (true, true) => {
                sentence.push_str(&format!(", {} {} is ready", self.quantity, self.target));
            }
            (false, _) => {
                sentence.push_str(", next: ");
                sentence.push_str(&jobs.join(", then "));
                if !crafts.is_empty() {
                    sentence.push_str("; finally assemble ");
                    sentence.push_str(&crafts.join(", "));
                }
            }
            (true, false) => {
                sentence.push_str(", assemble ");
                sentence.push_str(&crafts.join(", "));
            }
        }
        sentence.push('.');
        if !self.blockers.is_empty() {
            sentence.push_str(" Still needed: ");
            sentence.push_str(&self.blockers.join("; "));
            sentence.push('.');
        }
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, StepType};

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

    fn continuation(remaining: Vec<Step>) -> Continuation {
        Continuation {
            owner: "steve".into(),
            target: "stone_pickaxe".into(),
            quantity: 1,
            job_summary: "chop 1 oak_log".into(),
            remaining,
            blockers: Vec::new(),
            hop: 0,
        }
    }

    #[test]
    fn test_render_lists_jobs_then_assembly() {
        let c = continuation(vec![
            step(StepType::Craft, "stick", 4),
            step(StepType::Mine, "cobblestone", 3),
            step(StepType::Fish, "cod", 1),
            step(StepType::Craft, "stone_pickaxe", 1),
        ]);
        assert_eq!(
            c.render(),
            "After chop 1 oak_log, next: mine 3 cobblestone, then fish 1 cod; \
             finally assemble 4 stick, 1 stone_pickaxe."
        );
    }

    #[test]
    fn test_render_edge_cases() {
        assert_eq!(
            continuation(vec![]).render(),
            "After chop 1 oak_log, 1 stone_pickaxe is ready."
        );
        assert_eq!(
            continuation(vec![step(StepType::Craft, "stone_pickaxe", 1)]).render(),
            "After chop 1 oak_log, assemble 1 stone_pickaxe."
        );
    }

    #[test]
    fn test_render_appends_blockers() {
        let c = Continuation {
            blockers: vec!["gather 1 rock_3 by hand".into(), "nothing can smoke 1 cooked_beef automatically".into()],
            ..continuation(vec![step(StepType::Craft, "stone_pickaxe", 1)])
        };
        assert_eq!(
            c.render(),
            "After chop 1 oak_log, assemble 1 stone_pickaxe. \
             Still needed: gather 1 rock_3 by hand; nothing can smoke 1 cooked_beef automatically."
        );

        // Continuations stored before blockers existed still decode.
        let mut value = serde_json::to_value(&c).unwrap();
        value.as_object_mut().unwrap().remove("blockers");
        let decoded = Continuation::decode(&value.to_string()).unwrap();
        assert!(decoded.blockers.is_empty());
    }

    #[test]
    fn test_encoding_keeps_the_contract() {
        let mut smelt = step(StepType::Smelt, "iron_ingot", 3);
        smelt.consumes = vec![Ingredient::new("raw_iron", 3)];
        let c = Continuation {
            hop: 2,
            ..continuation(vec![smelt, step(StepType::Craft, "iron_pickaxe", 1)])
        };
        let decoded = Continuation::decode(&c.encode().unwrap()).unwrap();
        assert_eq!(decoded, c);
        assert_eq!(decoded.pending_jobs().count(), 1);

        assert!(matches!(
            Continuation::decode("{\"owner\": 3}"),
            Err(ContinuationError::Malformed(_))
        ));
    }
}
