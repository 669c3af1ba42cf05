use super::rules::{Fuel, HeatRules, TierTable, ToolTierEntry};
use super::{CatalogError, RecipeCatalog};
use crate::model::{HeatKind, InputSlot, MethodId, ProductionMethod, Resource, ResourceId, StepType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn one() -> u32 {
    1
}

/// A method as written by hand or in a catalog file. Ids are assigned on build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub output: ResourceId,
    #[serde(default = "one")]
    pub output_quantity: u32,
    pub step_type: StepType,
    #[serde(default)]
    pub inputs: Vec<InputSlot>,
    #[serde(default)]
    pub default: bool,
}

impl MethodSpec {
    pub fn new(output: impl Into<ResourceId>, output_quantity: u32, step_type: StepType) -> Self {
        Self {
            output: output.into(),
            output_quantity,
            step_type,
            inputs: Vec::new(),
            default: false,
        }
    }

    pub fn input(mut self, slot: InputSlot) -> Self {
        self.inputs.push(slot);
        self
    }
}

impl From<&ProductionMethod> for MethodSpec {
    fn from(method: &ProductionMethod) -> Self {
        Self {
            output: method.output.clone(),
            output_quantity: method.output_quantity,
            step_type: method.step_type,
            inputs: method.inputs.clone(),
            default: method.default,
        }
    }
}

/// Accumulates resources, methods and rules, then validates them all at once.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    resources: Vec<Resource>,
    methods: Vec<MethodSpec>,
    tiers: TierTable,
    heat: HeatRules,
}

impl CatalogBuilder {
    pub fn resource(mut self, id: &str, label: &str) -> Self {
        self.resources.push(Resource::new(id, label));
        self
    }

    /// A resource obtained from the world with no inputs.
    pub fn raw(self, id: &str, label: &str, step_type: StepType) -> Self {
        self.resource(id, label).default_method(MethodSpec::new(id, 1, step_type))
    }

    pub fn method(mut self, spec: MethodSpec) -> Self {
        self.methods.push(spec);
        self
    }

    pub fn default_method(self, spec: MethodSpec) -> Self {
        self.method(MethodSpec {
            default: true,
            ..spec
        })
    }

    pub fn tool_tier(mut self, tier: u8, tool: &str) -> Self {
        self.tiers.tiers.push(ToolTierEntry {
            tier,
            tool: tool.into(),
        });
        self
    }

    pub fn requires_tier(mut self, resource: &str, tier: u8) -> Self {
        self.tiers.requirements.insert(resource.into(), tier);
        self
    }

    pub fn station(mut self, kind: HeatKind, resource: &str) -> Self {
        self.heat.stations.insert(kind, resource.into());
        self
    }

    pub fn fuel(mut self, resource: &str, smelts: u32) -> Self {
        self.heat.fuels.push(Fuel {
            resource: resource.into(),
            smelts,
        });
        self
    }

    pub fn fallback_fuel(mut self, resource: &str) -> Self {
        self.heat.fallback_fuel = Some(resource.into());
        self
    }

    pub(super) fn with_rules(mut self, tiers: TierTable, heat: HeatRules) -> Self {
        self.tiers = tiers;
        self.heat = heat;
        self
    }

    pub fn build(self) -> Result<RecipeCatalog, CatalogError> {
        let mut index = HashMap::with_capacity(self.resources.len());
        for (i, resource) in self.resources.iter().enumerate() {
            if index.insert(resource.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateResource(resource.id.clone()));
            }
        }
        let known = |context: &str, resource: &ResourceId| {
            if index.contains_key(resource) {
                Ok(())
            } else {
                Err(CatalogError::UnknownResource {
                    context: context.to_string(),
                    resource: resource.clone(),
                })
            }
        };

        let mut methods = Vec::with_capacity(self.methods.len());
        let mut by_output: HashMap<ResourceId, Vec<MethodId>> = HashMap::new();
        for (i, spec) in self.methods.into_iter().enumerate() {
            let context = format!("Method for {}", spec.output);
            known(&context, &spec.output)?;
            if spec.step_type == StepType::Available {
                return Err(CatalogError::AvailableMethod {
                    output: spec.output,
                });
            }
            if spec.output_quantity == 0 || spec.inputs.iter().any(|slot| slot.quantity == 0) {
                return Err(CatalogError::ZeroQuantity {
                    output: spec.output,
                });
            }
            for slot in &spec.inputs {
                if slot.variants.is_empty() {
                    return Err(CatalogError::EmptySlot {
                        output: spec.output.clone(),
                    });
                }
                for variant in &slot.variants {
                    known(&context, variant)?;
                }
            }

            let id = MethodId(i);
            by_output.entry(spec.output.clone()).or_default().push(id);
            methods.push(ProductionMethod {
                id,
                output: spec.output,
                output_quantity: spec.output_quantity,
                step_type: spec.step_type,
                inputs: spec.inputs,
                default: spec.default,
            });
        }

        for entry in &self.tiers.tiers {
            known("Tool tier", &entry.tool)?;
        }
        for resource in self.tiers.requirements.keys() {
            known("Tier requirement", resource)?;
        }
        for station in self.heat.stations.values() {
            known("Heat station", station)?;
        }
        for fuel in &self.heat.fuels {
            known("Fuel", &fuel.resource)?;
            if fuel.smelts == 0 {
                return Err(CatalogError::ZeroQuantity {
                    output: fuel.resource.clone(),
                });
            }
        }
        if let Some(fallback) = &self.heat.fallback_fuel {
            known("Fallback fuel", fallback)?;
        }

        Ok(RecipeCatalog {
            resources: self.resources,
            index,
            methods,
            by_output,
            tiers: self.tiers,
            heat: self.heat,
        })
    }
}
