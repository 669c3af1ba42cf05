//! # Prerequisite Injector
//!
//! Post-compilation passes that prepend the implicit steps a plan is missing:
//! a heat station and fuel for heat-processing steps ([`HeatPass`]) and the
//! pickaxe chain for tier-gated mining ([`ToolTierPass`]).
//!
//! Passes look only at the final step list and at the stock left over once
//! the main request was resolved, so running a pass on its own output changes
//! nothing. [`Injector::run`] repeats heat then tools until the plan stops
//! changing: a tool chain can bring its own smelting, and a fuel chain its
//! own mining.

mod heat;
mod tools;

pub use heat::HeatPass;
pub use tools::ToolTierPass;

use crate::catalog::RecipeCatalog;
use crate::compiler::{Plan, Shortfall};
use crate::config::PlannerConfig;
use crate::model::{ActorId, HeatKind, ResourceId};
use crate::resolver::Resolver;
use crate::stock::{Stock, StockSnapshot};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_ROUNDS: usize = 4;

/// Tool tier lookups.
pub trait ToolTiers: Send + Sync {
    /// Best tier the actor can mine with right now.
    fn current(&self, actor: &ActorId) -> u8;
    /// Tier needed to mine `resource`.
    fn required(&self, resource: &ResourceId) -> u8;
}

/// Tiers from the catalog's tier table, current tier from a stock snapshot.
#[derive(Clone)]
pub struct CatalogTiers {
    catalog: Arc<RecipeCatalog>,
    snapshot: Arc<dyn StockSnapshot>,
}

impl CatalogTiers {
    pub fn new(catalog: Arc<RecipeCatalog>, snapshot: Arc<dyn StockSnapshot>) -> Self {
        Self { catalog, snapshot }
    }
}

impl ToolTiers for CatalogTiers {
    fn current(&self, actor: &ActorId) -> u8 {
        self.catalog.tiers().best_owned(&self.snapshot.query(actor))
    }

    fn required(&self, resource: &ResourceId) -> u8 {
        self.catalog.tiers().required(resource)
    }
}

/// What the passes work with besides the plan.
pub struct InjectionContext<'a> {
    pub actor: &'a ActorId,
    /// Stock left after the main request; injected chains draw on it.
    pub residual: Stock,
    pub tiers: &'a dyn ToolTiers,
}

/// A prerequisite that cannot be met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    StationUnknown(HeatKind),
    StationUnavailable {
        station: ResourceId,
        missing: Vec<Shortfall>,
    },
    FuelUnknown,
    FuelUnavailable {
        fuel: ResourceId,
        quantity: u32,
        missing: Vec<Shortfall>,
    },
    ToolUnknown {
        tier: u8,
    },
    ToolUnavailable {
        tier: u8,
        tool: ResourceId,
        missing: Vec<Shortfall>,
    },
}

fn listed(missing: &[Shortfall]) -> String {
    let parts: Vec<_> = missing.iter().map(ToString::to_string).collect();
    parts.join(", ")
}

impl Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StationUnknown(kind) => write!(f, "no {kind} station is known"),
            Self::StationUnavailable { station, missing } => {
                write!(f, "cannot build a {station}: missing {}", listed(missing))
            }
            Self::FuelUnknown => f.write_str("out of fuel and no fallback fuel is configured"),
            Self::FuelUnavailable {
                fuel,
                quantity,
                missing,
            } => write!(f, "cannot get {quantity} {fuel} for fuel: missing {}", listed(missing)),
            Self::ToolUnknown { tier } => write!(f, "no tool is known for mining tier {tier}"),
            Self::ToolUnavailable {
                tier,
                tool,
                missing,
            } => write!(f, "cannot make a {tool} (tier {tier}): missing {}", listed(missing)),
        }
    }
}

/// A post-compilation pass.
pub trait InjectionPass {
    fn name(&self) -> &'static str;

    /// Prepends missing steps to `plan` and returns what could not be met.
    fn apply(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Vec<Prerequisite>;
}

/// Resolves one prerequisite chain from the residual stock.
///
/// Returns the chain plan, or the blocking shortfalls that stop it. Residual
/// stock is only consumed when the chain is usable.
pub(crate) fn resolve_chain(
    resolver: &Resolver,
    resource: &ResourceId,
    quantity: u32,
    pool: &mut Stock,
) -> Result<Plan, Vec<Shortfall>> {
    let mut trial = pool.clone();
    let tree = resolver.resolve(resource, quantity, &mut trial);
    let blocking = tree.blocking_shortfalls();
    if !blocking.is_empty() {
        return Err(blocking);
    }
    *pool = trial;
    Ok(Plan::from_tree(&tree))
}

/// Runs [`HeatPass`] then [`ToolTierPass`] to a fixed point.
#[derive(Debug, Clone)]
pub struct Injector {
    resolver: Resolver,
    fallback_fuel: Option<ResourceId>,
}

impl Injector {
    pub fn new(resolver: Resolver, config: &PlannerConfig) -> Self {
        Self {
            resolver,
            fallback_fuel: config.fallback_fuel.clone(),
        }
    }

    pub fn run(&self, plan: &mut Plan, ctx: &mut InjectionContext<'_>) -> Vec<Prerequisite> {
        let heat = HeatPass::new(&self.resolver, self.fallback_fuel.as_ref());
        let tools = ToolTierPass::new(&self.resolver);
        let passes: [&dyn InjectionPass; 2] = [&heat, &tools];

        let mut problems = Vec::new();
        for round in 0..MAX_ROUNDS {
            let before = plan.steps.clone();
            problems.clear();
            for pass in passes {
                problems.extend(pass.apply(plan, ctx));
                debug!(actor = %ctx.actor, pass = pass.name(), round, steps = plan.steps.len(), "Pass applied");
            }
            if plan.steps == before {
                break;
            }
            info!(actor = %ctx.actor, target = %plan.target, round, steps = plan.steps.len(), "Injected prerequisites");
        }
        for problem in &problems {
            warn!(actor = %ctx.actor, target = %plan.target, %problem, "Prerequisite unavailable");
        }
        problems
    }
}
