use crate::compiler::Shortfall;
use crate::injector::Prerequisite;
use crate::model::{ResourceId, Step};
use crate::resolver::Unresolved;
use std::fmt::Display;

/// One reason a request cannot go ahead right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Missing {
        resource: ResourceId,
        quantity: u32,
        reason: Unresolved,
    },
    /// Past the depth bound; the player has to fetch it.
    GatherManually { resource: ResourceId, quantity: u32 },
    Prerequisite(Prerequisite),
    /// An async step with no job to run it.
    JobUnavailable { step: Step },
    AssemblyFailed { step: Step, reason: String },
}

impl From<Shortfall> for ReportLine {
    fn from(shortfall: Shortfall) -> Self {
        match shortfall.reason {
            Unresolved::DepthExceeded => Self::GatherManually {
                resource: shortfall.resource,
                quantity: shortfall.quantity,
            },
            reason => Self::Missing {
                resource: shortfall.resource,
                quantity: shortfall.quantity,
                reason,
            },
        }
    }
}

impl Display for ReportLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing {
                resource,
                quantity,
                reason,
            } => write!(f, "missing {quantity} {resource}: {reason}"),
            Self::GatherManually { resource, quantity } => {
                write!(f, "gather {quantity} {resource} by hand")
            }
            Self::Prerequisite(problem) => write!(f, "{problem}"),
            Self::JobUnavailable { step } => {
                write!(f, "nothing can {} automatically", step.describe())
            }
            Self::AssemblyFailed { step, reason } => {
                write!(f, "could not {}: {reason}", step.describe())
            }
        }
    }
}

/// Why `quantity` of `target` cannot be obtained right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReport {
    pub target: ResourceId,
    /// How the target is named in the header.
    pub label: String,
    pub quantity: u32,
    pub lines: Vec<ReportLine>,
}

impl MissingReport {
    pub fn new(target: ResourceId, quantity: u32) -> Self {
        Self {
            label: target.to_string(),
            target,
            quantity,
            lines: Vec::new(),
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn push(&mut self, line: ReportLine) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for MissingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot get {} {} yet", self.quantity, self.label)?;
        for line in &self.lines {
            write!(f, "\n- {line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepType;

    #[test]
    fn test_shortfalls_become_lines() {
        let depth: ReportLine = Shortfall {
            resource: "rock_3".into(),
            quantity: 2,
            reason: Unresolved::DepthExceeded,
        }
        .into();
        assert_eq!(depth.to_string(), "gather 2 rock_3 by hand");

        let cycle: ReportLine = Shortfall {
            resource: "egg".into(),
            quantity: 1,
            reason: Unresolved::Cycle,
        }
        .into();
        assert_eq!(cycle.to_string(), "missing 1 egg: its recipe depends on itself");
    }

    #[test]
    fn test_report_renders_every_line_once() {
        let smoke = Step {
            step_type: StepType::Smoke,
            resource: "cooked_beef".into(),
            quantity: 2,
            runs: 2,
            output_per_run: 1,
            produced: 2,
            consumes: vec![],
        };
        let mut report = MissingReport::new("cooked_beef".into(), 2);
        report.push(ReportLine::JobUnavailable { step: smoke.clone() });
        report.push(ReportLine::JobUnavailable { step: smoke });
        assert_eq!(
            report.to_string(),
            "Cannot get 2 cooked_beef yet\n- nothing can smoke 2 cooked_beef automatically"
        );

        let report = MissingReport::new("cooked_beef".into(), 2).labelled("Steak");
        assert_eq!(report.to_string(), "Cannot get 2 Steak yet");
    }
}
