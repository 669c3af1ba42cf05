//! Tool tiers and heat-processing rules carried by the catalog.

use crate::model::{HeatKind, ResourceId};
use crate::stock::Stock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tool that unlocks a mining tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTierEntry {
    pub tier: u8,
    pub tool: ResourceId,
}

/// Tier ladder plus the tier each mined resource demands.
///
/// Tier 0 means bare hands and has no tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    pub tiers: Vec<ToolTierEntry>,
    #[serde(default)]
    pub requirements: BTreeMap<ResourceId, u8>,
}

impl TierTable {
    pub fn tool_for(&self, tier: u8) -> Option<&ResourceId> {
        self.tiers
            .iter()
            .find(|entry| entry.tier == tier)
            .map(|entry| &entry.tool)
    }

    pub fn tier_of(&self, tool: &ResourceId) -> Option<u8> {
        self.tiers
            .iter()
            .find(|entry| &entry.tool == tool)
            .map(|entry| entry.tier)
    }

    pub fn required(&self, resource: &ResourceId) -> u8 {
        self.requirements.get(resource).copied().unwrap_or(0)
    }

    /// Highest tier whose tool is present in `stock`.
    pub fn best_owned(&self, stock: &Stock) -> u8 {
        self.tiers
            .iter()
            .filter(|entry| stock.available(&entry.tool) > 0)
            .map(|entry| entry.tier)
            .max()
            .unwrap_or(0)
    }
}

/// A burnable resource and how many items one unit processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fuel {
    pub resource: ResourceId,
    pub smelts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatRules {
    /// Station resource per heat family.
    #[serde(default)]
    pub stations: BTreeMap<HeatKind, ResourceId>,
    /// Accepted fuels in preference order.
    #[serde(default)]
    pub fuels: Vec<Fuel>,
    /// Fuel to acquire when owned and planned fuel fall short.
    #[serde(default)]
    pub fallback_fuel: Option<ResourceId>,
}

impl HeatRules {
    pub fn station_for(&self, kind: HeatKind) -> Option<&ResourceId> {
        self.stations.get(&kind)
    }

    pub fn fuel(&self, resource: &ResourceId) -> Option<&Fuel> {
        self.fuels.iter().find(|fuel| &fuel.resource == resource)
    }

    pub fn fallback(&self) -> Option<&Fuel> {
        self.fallback_fuel
            .as_ref()
            .and_then(|resource| self.fuel(resource))
    }
}
