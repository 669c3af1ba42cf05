//! # Stock Snapshot
//!
//! Everything an actor can draw on, read once into a private [`Stock`] before
//! planning starts. Planning then works against that copy only: the real
//! inventory may change while jobs run, which is why every continuation hop
//! takes a fresh snapshot instead of trusting the old one.

mod aggregate;
mod memory;

pub use aggregate::AggregateSnapshot;
pub use memory::MemoryInventory;

use crate::model::{ActorId, ResourceId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counter {
    start: u32,
    left: u32,
}

/// Point-in-time resource counters.
///
/// Counters only go down through [`Stock::take`], which saturates, so every
/// counter stays within `0..=starting`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stock {
    counts: BTreeMap<ResourceId, Counter>,
}

impl Stock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts<I, R>(counts: I) -> Self
    where
        I: IntoIterator<Item = (R, u32)>,
        R: Into<ResourceId>,
    {
        let mut stock = Self::new();
        for (resource, quantity) in counts {
            stock.add(resource, quantity);
        }
        stock
    }

    /// Adds `quantity` to both the starting and the available count.
    pub fn add(&mut self, resource: impl Into<ResourceId>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let counter = self.counts.entry(resource.into()).or_default();
        counter.start = counter.start.saturating_add(quantity);
        counter.left = counter.left.saturating_add(quantity);
    }

    /// Sums another snapshot into this one.
    pub fn absorb(&mut self, other: &Stock) {
        for (resource, counter) in &other.counts {
            let mine = self.counts.entry(resource.clone()).or_default();
            mine.start = mine.start.saturating_add(counter.start);
            mine.left = mine.left.saturating_add(counter.left);
        }
    }

    pub fn available(&self, resource: &ResourceId) -> u32 {
        self.counts.get(resource).map_or(0, |c| c.left)
    }

    pub fn starting(&self, resource: &ResourceId) -> u32 {
        self.counts.get(resource).map_or(0, |c| c.start)
    }

    pub fn consumed(&self, resource: &ResourceId) -> u32 {
        self.counts.get(resource).map_or(0, |c| c.start - c.left)
    }

    /// Takes up to `quantity` and returns how much was actually taken.
    pub fn take(&mut self, resource: &ResourceId, quantity: u32) -> u32 {
        match self.counts.get_mut(resource) {
            Some(counter) => {
                let taken = counter.left.min(quantity);
                counter.left -= taken;
                taken
            }
            None => 0,
        }
    }

    /// Applies the reductions a trial copy made to resources both share.
    ///
    /// Resources missing from `trial` (see [`Stock::without`]) are left alone.
    pub fn commit(&mut self, trial: &Stock) {
        for (resource, counter) in self.counts.iter_mut() {
            if let Some(after) = trial.counts.get(resource) {
                counter.left = counter.left.min(after.left);
            }
        }
    }

    /// A copy with the given resources removed entirely.
    pub fn without<'a>(&self, resources: impl IntoIterator<Item = &'a ResourceId>) -> Stock {
        let mut copy = self.clone();
        for resource in resources {
            copy.counts.remove(resource);
        }
        copy
    }

    /// Currently available counts, skipping exhausted entries.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, u32)> {
        self.counts
            .iter()
            .filter(|(_, c)| c.left > 0)
            .map(|(resource, c)| (resource, c.left))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Read-only view of what an actor can currently draw on.
pub trait StockSnapshot: Send + Sync {
    fn query(&self, actor: &ActorId) -> Stock;
}

/// One place an actor keeps things: its own inventory, a companion's, a
/// tagged home chest.
pub trait InventorySource: Send + Sync {
    fn label(&self) -> &str;
    fn contents(&self, actor: &ActorId) -> Stock;
}
