//! # Dependency Resolver
//!
//! Expands a `(resource, quantity)` request into a [`DependencyNode`] tree
//! against a private [`Stock`] copy.
//!
//! For every node the resolver first draws on owned stock. Whatever is left
//! is produced by a method chosen in this order:
//!
//! 1. methods whose inputs are already satisfiable from stock,
//! 2. the catalog's default method,
//! 3. the remaining methods,
//!
//! each group in catalog order. Every candidate is expanded on a cloned
//! stock; the first one whose subtree is complete is kept, otherwise the
//! first candidate's partial subtree is. Interchangeable slot variants are
//! tried the same way, owned variants first.
//!
//! Resolution never fails. A resource already being produced on the current
//! branch becomes [`Unresolved::Cycle`], a node past the depth bound becomes
//! [`Unresolved::DepthExceeded`], and both stop recursion there.
//!
//! Surplus output (a run yielding more than the deficit) is not credited back
//! to stock.

mod node;

pub use node::{DependencyNode, NodeSource, Unresolved};

use crate::catalog::RecipeCatalog;
use crate::config::PlannerConfig;
use crate::model::{InputSlot, ProductionMethod, ResourceId};
use crate::stock::Stock;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<RecipeCatalog>,
    max_depth: usize,
    prefer_satisfiable: bool,
}

impl Resolver {
    pub fn new(catalog: Arc<RecipeCatalog>, config: &PlannerConfig) -> Self {
        Self {
            catalog,
            max_depth: config.max_depth,
            prefer_satisfiable: config.prefer_satisfiable,
        }
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Resolves `quantity` of `resource`, consuming from `stock` whatever the
    /// returned tree uses.
    pub fn resolve(&self, resource: &ResourceId, quantity: u32, stock: &mut Stock) -> DependencyNode {
        let mut path = Vec::new();
        let root = self.resolve_at(resource, quantity, stock, &mut path, 0);
        debug!(%resource, quantity, complete = root.is_complete(), height = root.height(), "Resolved request");
        root
    }

    fn resolve_at(
        &self,
        resource: &ResourceId,
        quantity: u32,
        stock: &mut Stock,
        path: &mut Vec<ResourceId>,
        depth: usize,
    ) -> DependencyNode {
        let owned = stock.take(resource, quantity);
        if owned == quantity {
            return DependencyNode::available(resource.clone(), quantity);
        }
        let deficit = quantity - owned;
        let unresolved =
            |reason| DependencyNode::unresolved(resource.clone(), quantity, owned, reason);

        if path.contains(resource) {
            warn!(%resource, quantity = deficit, depth, "Recipe cycle, not expanding");
            return unresolved(Unresolved::Cycle);
        }
        if depth >= self.max_depth {
            warn!(%resource, quantity = deficit, depth, "Depth bound reached, gather manually");
            return unresolved(Unresolved::DepthExceeded);
        }

        let candidates = self.candidates(resource, deficit, stock);
        path.push(resource.clone());
        let mut fallback = None;
        let mut chosen = None;
        for method in candidates {
            let mut trial = stock.clone();
            let node = self.expand(method, resource, quantity, owned, &mut trial, path, depth);
            if node.is_complete() {
                chosen = Some((node, trial));
                break;
            }
            if fallback.is_none() {
                fallback = Some((node, trial));
            }
        }
        path.pop();

        match chosen.or(fallback) {
            Some((node, after)) => {
                *stock = after;
                node
            }
            None => {
                warn!(%resource, quantity = deficit, "No production method");
                unresolved(Unresolved::NoMethod)
            }
        }
    }

    /// Methods for `resource` in trial order.
    fn candidates<'a>(&'a self, resource: &ResourceId, deficit: u32, stock: &Stock) -> Vec<&'a ProductionMethod> {
        let all: Vec<_> = self.catalog.methods_for(resource).collect();
        let mut ordered = Vec::with_capacity(all.len());
        if self.prefer_satisfiable {
            ordered.extend(all.iter().copied().filter(|method| {
                method.satisfiable_with(method.runs_for(deficit), |input| stock.available(input))
            }));
        }
        if let Some(default) = self.catalog.default_method(resource) {
            if !ordered.iter().any(|method| method.id == default.id) {
                ordered.push(default);
            }
        }
        for method in all {
            if !ordered.iter().any(|chosen| chosen.id == method.id) {
                ordered.push(method);
            }
        }
        ordered
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        method: &ProductionMethod,
        resource: &ResourceId,
        quantity: u32,
        owned: u32,
        stock: &mut Stock,
        path: &mut Vec<ResourceId>,
        depth: usize,
    ) -> DependencyNode {
        let runs = method.runs_for(quantity - owned);
        let mut children = Vec::with_capacity(method.inputs.len());
        for slot in &method.inputs {
            let needed = runs.saturating_mul(slot.quantity);
            if let Some(child) = self.resolve_slot(slot, needed, stock, path, depth + 1) {
                children.push(child);
            }
        }
        debug!(%resource, quantity, method = %method.id, step = %method.step_type, runs, depth, "Expanded");
        DependencyNode {
            resource: resource.clone(),
            quantity,
            owned_used: owned,
            source: NodeSource::Produced {
                method: method.id,
                step_type: method.step_type,
                runs,
                output_per_run: method.output_quantity,
            },
            children,
        }
    }

    fn resolve_slot(
        &self,
        slot: &InputSlot,
        needed: u32,
        stock: &mut Stock,
        path: &mut Vec<ResourceId>,
        depth: usize,
    ) -> Option<DependencyNode> {
        let preferred = match slot.variants.as_slice() {
            [] => return None,
            [only] => return Some(self.resolve_at(only, needed, stock, path, depth)),
            [preferred, ..] => preferred,
        };

        // Variants already covered by stock go first.
        let (owned, rest): (Vec<&ResourceId>, Vec<&ResourceId>) = slot
            .variants
            .iter()
            .partition(|variant| stock.available(variant) >= needed);

        let mut first = None;
        for variant in owned.into_iter().chain(rest) {
            let mut trial = stock.clone();
            let node = self.resolve_at(variant, needed, &mut trial, path, depth);
            if node.is_complete() {
                *stock = trial;
                return Some(node);
            }
            if first.is_none() {
                first = Some((node, trial));
            }
        }

        match first {
            // Only depth-bound gaps: keep it as the best-effort answer.
            Some((node, trial)) if node.blocking_shortfalls().is_empty() => {
                *stock = trial;
                Some(node)
            }
            _ => {
                warn!(resource = %preferred, quantity = needed, variants = slot.variants.len(), "No variant obtainable");
                Some(DependencyNode::unresolved(
                    preferred.clone(),
                    needed,
                    0,
                    Unresolved::VariantsExhausted {
                        variants: slot.variants.clone(),
                    },
                ))
            }
        }
    }
}
