//! # Recipe Catalog
//!
//! Read-only lookup of resources and the methods that produce them. A
//! catalog is built once (in code through [`CatalogBuilder`], or from JSON
//! through [`RecipeCatalog::from_json`]), validated, and then shared behind an
//! `Arc` by every component that plans against it.

mod builder;
mod rules;
mod vanilla;

pub use builder::{CatalogBuilder, MethodSpec};
pub use rules::{Fuel, HeatRules, TierTable, ToolTierEntry};
pub use vanilla::vanilla;

use crate::model::{MethodId, ProductionMethod, Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Resource {0} is declared twice")]
    DuplicateResource(ResourceId),

    #[error("{context} references unknown resource {resource}")]
    UnknownResource {
        context: String,
        resource: ResourceId,
    },

    #[error("Method for {output} has an input slot with no variants")]
    EmptySlot { output: ResourceId },

    #[error("Method for {output} has a zero quantity")]
    ZeroQuantity { output: ResourceId },

    #[error("Method for {output} cannot be of type 'available'")]
    AvailableMethod { output: ResourceId },

    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub resources: Vec<Resource>,
    pub methods: Vec<MethodSpec>,
    #[serde(default)]
    pub tiers: TierTable,
    #[serde(default)]
    pub heat: HeatRules,
}

#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    resources: Vec<Resource>,
    index: HashMap<ResourceId, usize>,
    methods: Vec<ProductionMethod>,
    by_output: HashMap<ResourceId, Vec<MethodId>>,
    tiers: TierTable,
    heat: HeatRules,
}

impl RecipeCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::default();
        for resource in file.resources {
            builder = builder.resource(resource.id.as_str(), &resource.label);
        }
        for spec in file.methods {
            builder = builder.method(spec);
        }
        builder.with_rules(file.tiers, file.heat).build()
    }

    /// Exports the catalog in its file layout.
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            resources: self.resources.clone(),
            methods: self.methods.iter().map(MethodSpec::from).collect(),
            tiers: self.tiers.clone(),
            heat: self.heat.clone(),
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.index.get(id).map(|&i| &self.resources[i])
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.index.contains_key(id)
    }

    /// Display label, falling back to the raw identifier.
    pub fn label<'a>(&'a self, id: &'a ResourceId) -> &'a str {
        self.resource(id)
            .map(|resource| resource.label.as_str())
            .unwrap_or(id.as_str())
    }

    pub fn method(&self, id: MethodId) -> Option<&ProductionMethod> {
        self.methods.get(id.0)
    }

    /// Methods producing `output`, in catalog order.
    pub fn methods_for<'a>(
        &'a self,
        output: &ResourceId,
    ) -> impl Iterator<Item = &'a ProductionMethod> + 'a {
        self.by_output
            .get(output)
            .into_iter()
            .flatten()
            .filter_map(|id| self.method(*id))
    }

    /// The method flagged as default, else the first one listed.
    pub fn default_method(&self, output: &ResourceId) -> Option<&ProductionMethod> {
        self.methods_for(output)
            .find(|method| method.default)
            .or_else(|| self.methods_for(output).next())
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn heat(&self) -> &HeatRules {
        &self.heat
    }
}
