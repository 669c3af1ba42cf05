use super::{InventorySource, Stock, StockSnapshot};
use crate::model::ActorId;
use std::sync::Arc;
use tracing::debug;

/// Sums personal, companion and tagged storage into one snapshot.
#[derive(Clone, Default)]
pub struct AggregateSnapshot {
    sources: Vec<Arc<dyn InventorySource>>,
}

impl AggregateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Arc<dyn InventorySource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl StockSnapshot for AggregateSnapshot {
    fn query(&self, actor: &ActorId) -> Stock {
        let mut total = Stock::new();
        for source in &self.sources {
            let contents = source.contents(actor);
            debug!(%actor, source = source.label(), kinds = contents.iter().count(), "Read inventory");
            total.absorb(&contents);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::MemoryInventory;

    #[test]
    fn test_sums_every_source() {
        let steve = ActorId::from("steve");
        let personal = MemoryInventory::new("personal");
        let companion = MemoryInventory::new("companion");
        let home = MemoryInventory::new("home");
        personal.deposit(&steve, &"coal".into(), 2);
        companion.deposit(&steve, &"coal".into(), 3);
        home.deposit(&steve, &"oak_log".into(), 8);
        home.deposit(&"alex".into(), &"diamond".into(), 1);

        let snapshot = AggregateSnapshot::new()
            .with_source(Arc::new(personal))
            .with_source(Arc::new(companion))
            .with_source(Arc::new(home));
        let stock = snapshot.query(&steve);
        assert_eq!(stock.available(&"coal".into()), 5);
        assert_eq!(stock.available(&"oak_log".into()), 8);
        assert_eq!(stock.available(&"diamond".into()), 0);
    }
}
