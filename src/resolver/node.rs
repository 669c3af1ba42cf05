use crate::compiler::Shortfall;
use crate::model::{MethodId, ResourceId, StepType};
use std::fmt::Display;

/// Why a requirement could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No stock and no method produces it.
    NoMethod,
    /// Resolution hit the depth bound here. Best effort: gather it by hand.
    DepthExceeded,
    /// The resource is already being produced further up this branch.
    Cycle,
    /// None of a slot's interchangeable variants could be obtained.
    VariantsExhausted { variants: Vec<ResourceId> },
}

impl Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMethod => f.write_str("no known way to obtain it"),
            Self::DepthExceeded => f.write_str("recipe chain too deep to plan"),
            Self::Cycle => f.write_str("its recipe depends on itself"),
            Self::VariantsExhausted { variants } => {
                let names: Vec<_> = variants.iter().map(ResourceId::as_str).collect();
                write!(f, "none of {} could be obtained", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSource {
    /// Fully covered by owned stock.
    Available,
    Produced {
        method: MethodId,
        step_type: StepType,
        runs: u32,
        output_per_run: u32,
    },
    Unresolved(Unresolved),
}

/// How to obtain `quantity` of `resource`.
///
/// `owned_used` is the part drawn from stock at this node; children cover
/// the rest through the chosen method, one child per input slot, each at
/// `runs * slot quantity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub resource: ResourceId,
    pub quantity: u32,
    pub owned_used: u32,
    pub source: NodeSource,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn available(resource: ResourceId, quantity: u32) -> Self {
        Self {
            resource,
            quantity,
            owned_used: quantity,
            source: NodeSource::Available,
            children: Vec::new(),
        }
    }

    pub fn unresolved(resource: ResourceId, quantity: u32, owned_used: u32, reason: Unresolved) -> Self {
        Self {
            resource,
            quantity,
            owned_used,
            source: NodeSource::Unresolved(reason),
            children: Vec::new(),
        }
    }

    /// What this node still has to come up with beyond owned stock.
    pub fn deficit(&self) -> u32 {
        self.quantity - self.owned_used
    }

    pub fn is_available(&self) -> bool {
        matches!(self.source, NodeSource::Available)
    }

    /// True if no node in the subtree is unresolved.
    pub fn is_complete(&self) -> bool {
        !matches!(self.source, NodeSource::Unresolved(_))
            && self.children.iter().all(DependencyNode::is_complete)
    }

    /// Pre-order traversal with each node's depth.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&DependencyNode, usize),
    {
        self.walk_at(0, visit);
    }

    fn walk_at<F>(&self, depth: usize, visit: &mut F)
    where
        F: FnMut(&DependencyNode, usize),
    {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Longest root-to-leaf path, counting the root as 1.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(DependencyNode::height).max().unwrap_or(0)
    }

    /// Every unresolved node as a shortfall, in traversal order.
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        let mut found = Vec::new();
        self.walk(&mut |node, _| {
            if let NodeSource::Unresolved(reason) = &node.source {
                found.push(Shortfall {
                    resource: node.resource.clone(),
                    quantity: node.deficit(),
                    reason: reason.clone(),
                });
            }
        });
        found
    }

    pub fn blocking_shortfalls(&self) -> Vec<Shortfall> {
        self.shortfalls()
            .into_iter()
            .filter(Shortfall::blocking)
            .collect()
    }
}
