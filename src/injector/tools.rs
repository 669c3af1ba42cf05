use super::{resolve_chain, InjectionContext, InjectionPass, Prerequisite};
use crate::compiler::{Gate, Plan};
use crate::model::{ResourceId, StepType};
use crate::resolver::Resolver;
use tracing::debug;

/// Escalates the actor's pickaxe tier to what the plan's mining needs.
///
/// Tools the plan already leaves over count toward the current tier, so a
/// second run finds nothing to add. Missing tiers are resolved lowest first
/// and their chains prepended in that order; the first tier that cannot be
/// made stops the escalation.
pub struct ToolTierPass<'r> {
    resolver: &'r Resolver,
}

impl<'r> ToolTierPass<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self { resolver }
    }
}

impl ToolTierPass<'_> {
    fn escalate(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Vec<Prerequisite> {
        let required = plan
            .steps
            .iter()
            .filter(|step| step.step_type == StepType::Mine)
            .map(|step| ctx.tiers.required(&step.resource))
            .max()
            .unwrap_or(0);
        if required == 0 {
            return Vec::new();
        }

        let table = self.resolver.catalog().tiers();
        let planned = plan
            .steps
            .iter()
            .filter(|step| plan.surplus(&step.resource) > 0)
            .filter_map(|step| table.tier_of(&step.resource))
            .max()
            .unwrap_or(0);
        let current = ctx.tiers.current(ctx.actor).max(planned);
        if current >= required {
            return Vec::new();
        }
        debug!(actor = %ctx.actor, current, required, "Escalating tool tier");

        let mut chains: Vec<Plan> = Vec::new();
        let mut problems = Vec::new();
        for tier in current + 1..=required {
            let Some(tool) = table.tool_for(tier) else {
                problems.push(Prerequisite::ToolUnknown { tier });
                break;
            };
            match resolve_chain(self.resolver, tool, 1, &mut ctx.residual) {
                Ok(chain) => {
                    debug!(actor = %ctx.actor, resource = %tool, tier, steps = chain.steps.len(), "Adding tool chain");
                    chains.push(chain);
                }
                Err(missing) => {
                    problems.push(Prerequisite::ToolUnavailable {
                        tier,
                        tool: tool.clone(),
                        missing,
                    });
                    break;
                }
            }
        }
        plan.inject(chains);
        problems
    }

    /// A pickaxe the plan makes goes before every mine step it unlocks.
    fn order(&self, plan: &mut Plan, ctx: &InjectionContext<'_>) {
        let table = self.resolver.catalog().tiers();
        let held = ctx.tiers.current(ctx.actor);
        let tools: Vec<(ResourceId, u8)> = plan
            .steps
            .iter()
            .filter(|step| plan.surplus(&step.resource) > 0)
            .filter_map(|step| Some((step.resource.clone(), table.tier_of(&step.resource)?)))
            .filter(|(_, tier)| *tier > held)
            .collect();
        let mines: Vec<(ResourceId, u8)> = plan
            .steps
            .iter()
            .filter(|step| step.step_type == StepType::Mine)
            .map(|step| (step.resource.clone(), ctx.tiers.required(&step.resource)))
            .collect();
        for (tool, tier) in &tools {
            for (resource, required) in &mines {
                if required >= tier {
                    plan.gate(Gate {
                        requires: tool.clone(),
                        step_type: StepType::Mine,
                        resource: resource.clone(),
                    });
                }
            }
        }
    }
}

impl InjectionPass for ToolTierPass<'_> {
    fn name(&self) -> &'static str {
        "tool_tier"
    }

    fn apply(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Vec<Prerequisite> {
        let problems = self.escalate(plan, ctx);
        self.order(plan, ctx);
        problems
    }
}
