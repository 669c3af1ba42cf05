use super::{resolve_chain, InjectionContext, InjectionPass, Prerequisite};
use crate::compiler::{Gate, Plan};
use crate::model::{HeatKind, ResourceId, StepType};
use crate::resolver::Resolver;
use tracing::debug;

/// Makes sure every heat-processing step has a station and enough fuel.
///
/// A station counts if it is in residual stock or left over by the plan.
/// Fuel capacity is owned fuel plus fuel the plan makes beyond its own use,
/// each unit weighted by how many items it smelts. A shortfall is covered by
/// the fallback fuel, resolved without touching owned fuel so nothing is
/// counted twice.
pub struct HeatPass<'r> {
    resolver: &'r Resolver,
    fallback_fuel: Option<&'r ResourceId>,
}

impl<'r> HeatPass<'r> {
    pub fn new(resolver: &'r Resolver, fallback_fuel: Option<&'r ResourceId>) -> Self {
        Self {
            resolver,
            fallback_fuel,
        }
    }

    fn stations(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>, kinds: &[HeatKind]) -> Vec<Prerequisite> {
        let rules = self.resolver.catalog().heat();
        let mut problems = Vec::new();
        for &kind in kinds {
            let Some(station) = rules.station_for(kind) else {
                problems.push(Prerequisite::StationUnknown(kind));
                continue;
            };
            if ctx.residual.available(station) > 0 || plan.surplus(station) > 0 {
                continue;
            }
            match resolve_chain(self.resolver, station, 1, &mut ctx.residual) {
                Ok(chain) => {
                    debug!(actor = %ctx.actor, resource = %station, steps = chain.steps.len(), "Adding station chain");
                    plan.inject(vec![chain]);
                }
                Err(missing) => problems.push(Prerequisite::StationUnavailable {
                    station: station.clone(),
                    missing,
                }),
            }
        }
        problems
    }

    fn fuel(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Option<Prerequisite> {
        let rules = self.resolver.catalog().heat();
        let needed: u32 = plan
            .steps
            .iter()
            .filter(|step| step.step_type.heat_kind().is_some_and(HeatKind::needs_fuel))
            .fold(0u32, |total, step| total.saturating_add(step.runs));
        if needed == 0 {
            return None;
        }

        let capacity: u32 = rules
            .fuels
            .iter()
            .map(|fuel| {
                let units = ctx.residual.available(&fuel.resource).saturating_add(plan.surplus(&fuel.resource));
                units.saturating_mul(fuel.smelts)
            })
            .fold(0u32, u32::saturating_add);
        if capacity >= needed {
            return None;
        }

        let fallback = match self.fallback_fuel {
            Some(resource) => rules.fuel(resource),
            None => rules.fallback(),
        };
        let Some(fallback) = fallback else {
            return Some(Prerequisite::FuelUnknown);
        };
        let units = (needed - capacity).div_ceil(fallback.smelts.max(1));

        let mut pool = ctx
            .residual
            .without(rules.fuels.iter().map(|fuel| &fuel.resource));
        match resolve_chain(self.resolver, &fallback.resource, units, &mut pool) {
            Ok(chain) => {
                debug!(actor = %ctx.actor, resource = %fallback.resource, quantity = units, "Adding fuel chain");
                ctx.residual.commit(&pool);
                plan.inject(vec![chain]);
                None
            }
            Err(missing) => Some(Prerequisite::FuelUnavailable {
                fuel: fallback.resource.clone(),
                quantity: units,
                missing,
            }),
        }
    }

    /// Planned stations and fuel go before the heat steps they serve.
    fn order(&self, plan: &mut Plan) {
        let rules = self.resolver.catalog().heat();
        let heated: Vec<(StepType, ResourceId, HeatKind)> = plan
            .steps
            .iter()
            .filter_map(|step| {
                let kind = step.step_type.heat_kind()?;
                Some((step.step_type, step.resource.clone(), kind))
            })
            .collect();
        for (step_type, resource, kind) in heated {
            let mut needs: Vec<&ResourceId> = Vec::new();
            if let Some(station) = rules.station_for(kind) {
                if plan.produced(station) > 0 {
                    needs.push(station);
                }
            }
            if kind.needs_fuel() {
                needs.extend(
                    rules
                        .fuels
                        .iter()
                        .map(|fuel| &fuel.resource)
                        .filter(|fuel| plan.surplus(fuel) > 0),
                );
            }
            for requires in needs.into_iter().filter(|needed| **needed != resource) {
                plan.gate(Gate {
                    requires: requires.clone(),
                    step_type,
                    resource: resource.clone(),
                });
            }
        }
    }
}

impl InjectionPass for HeatPass<'_> {
    fn name(&self) -> &'static str {
        "heat"
    }

    fn apply(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Vec<Prerequisite> {
        let mut kinds: Vec<HeatKind> = Vec::new();
        for kind in plan.steps.iter().filter_map(|step| step.step_type.heat_kind()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Vec::new();
        }

        let mut problems = self.stations(plan, ctx, &kinds);
        problems.extend(self.fuel(plan, ctx));
        self.order(plan);
        problems
    }
}
