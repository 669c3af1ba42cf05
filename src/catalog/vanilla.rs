use super::builder::MethodSpec;
use super::{CatalogError, RecipeCatalog};
use crate::model::{HeatKind, InputSlot, StepType};

const LOGS: [&str; 2] = ["oak_log", "birch_log"];
const PLANKS: [&str; 2] = ["oak_planks", "birch_planks"];

fn craft(output: &str, quantity: u32) -> MethodSpec {
    MethodSpec::new(output, quantity, StepType::Craft)
}

/// A small survival-game catalog: wood, stone and iron tool chains, heat
/// processing, food and a deliberate ingot/block cycle.
pub fn vanilla() -> Result<RecipeCatalog, CatalogError> {
    let builder = RecipeCatalog::builder()
        // world resources
        .raw("oak_log", "Oak Log", StepType::Chop)
        .raw("birch_log", "Birch Log", StepType::Chop)
        .raw("cobblestone", "Cobblestone", StepType::Mine)
        .raw("coal", "Coal", StepType::Mine)
        .raw("raw_iron", "Raw Iron", StepType::Mine)
        .raw("diamond", "Diamond", StepType::Mine)
        .raw("sand", "Sand", StepType::Gather)
        .raw("wheat", "Wheat", StepType::Farm)
        .raw("cod", "Raw Cod", StepType::Fish)
        .raw("beef", "Raw Beef", StepType::KillMob)
        // intermediates and products
        .resource("oak_planks", "Oak Planks")
        .resource("birch_planks", "Birch Planks")
        .resource("stick", "Stick")
        .resource("crafting_table", "Crafting Table")
        .resource("charcoal", "Charcoal")
        .resource("torch", "Torch")
        .resource("iron_ingot", "Iron Ingot")
        .resource("iron_block", "Block of Iron")
        .resource("glass", "Glass")
        .resource("bread", "Bread")
        .resource("cooked_cod", "Cooked Cod")
        .resource("cooked_beef", "Steak")
        .resource("wooden_pickaxe", "Wooden Pickaxe")
        .resource("stone_pickaxe", "Stone Pickaxe")
        .resource("iron_pickaxe", "Iron Pickaxe")
        .resource("diamond_pickaxe", "Diamond Pickaxe")
        .resource("furnace", "Furnace")
        .resource("smoker", "Smoker")
        .resource("campfire", "Campfire");

    builder
        .method(craft("oak_planks", 4).input(InputSlot::single("oak_log", 1)))
        .method(craft("birch_planks", 4).input(InputSlot::single("birch_log", 1)))
        .method(craft("stick", 4).input(InputSlot::any_of(PLANKS, 2)))
        .method(craft("crafting_table", 1).input(InputSlot::any_of(PLANKS, 4)))
        .method(
            MethodSpec::new("charcoal", 1, StepType::Smelt).input(InputSlot::any_of(LOGS, 1)),
        )
        .method(
            craft("torch", 4)
                .input(InputSlot::any_of(["coal", "charcoal"], 1))
                .input(InputSlot::single("stick", 1)),
        )
        .default_method(
            MethodSpec::new("iron_ingot", 1, StepType::Smelt)
                .input(InputSlot::single("raw_iron", 1)),
        )
        .method(
            MethodSpec::new("iron_ingot", 1, StepType::Blast)
                .input(InputSlot::single("raw_iron", 1)),
        )
        .method(craft("iron_ingot", 9).input(InputSlot::single("iron_block", 1)))
        .method(craft("iron_block", 1).input(InputSlot::single("iron_ingot", 9)))
        .method(MethodSpec::new("glass", 1, StepType::Smelt).input(InputSlot::single("sand", 1)))
        .method(craft("bread", 1).input(InputSlot::single("wheat", 3)))
        .default_method(
            MethodSpec::new("cooked_cod", 1, StepType::Smelt).input(InputSlot::single("cod", 1)),
        )
        .method(
            MethodSpec::new("cooked_cod", 1, StepType::CampfireCook)
                .input(InputSlot::single("cod", 1)),
        )
        .default_method(
            MethodSpec::new("cooked_beef", 1, StepType::Smoke).input(InputSlot::single("beef", 1)),
        )
        .method(
            MethodSpec::new("cooked_beef", 1, StepType::Smelt).input(InputSlot::single("beef", 1)),
        )
        .method(
            craft("wooden_pickaxe", 1)
                .input(InputSlot::any_of(PLANKS, 3))
                .input(InputSlot::single("stick", 2)),
        )
        .method(
            craft("stone_pickaxe", 1)
                .input(InputSlot::single("cobblestone", 3))
                .input(InputSlot::single("stick", 2)),
        )
        .method(
            craft("iron_pickaxe", 1)
                .input(InputSlot::single("iron_ingot", 3))
                .input(InputSlot::single("stick", 2)),
        )
        .method(
            craft("diamond_pickaxe", 1)
                .input(InputSlot::single("diamond", 3))
                .input(InputSlot::single("stick", 2)),
        )
        .method(craft("furnace", 1).input(InputSlot::single("cobblestone", 8)))
        .method(
            craft("smoker", 1)
                .input(InputSlot::any_of(LOGS, 4))
                .input(InputSlot::single("furnace", 1)),
        )
        .method(
            craft("campfire", 1)
                .input(InputSlot::single("stick", 3))
                .input(InputSlot::any_of(["coal", "charcoal"], 1))
                .input(InputSlot::any_of(LOGS, 3)),
        )
        .tool_tier(1, "wooden_pickaxe")
        .tool_tier(2, "stone_pickaxe")
        .tool_tier(3, "iron_pickaxe")
        .tool_tier(4, "diamond_pickaxe")
        .requires_tier("cobblestone", 1)
        .requires_tier("coal", 1)
        .requires_tier("raw_iron", 2)
        .requires_tier("diamond", 3)
        .station(HeatKind::Furnace, "furnace")
        .station(HeatKind::Smoker, "smoker")
        .station(HeatKind::Campfire, "campfire")
        .fuel("coal", 8)
        .fuel("charcoal", 8)
        .fuel("oak_planks", 1)
        .fuel("birch_planks", 1)
        .fallback_fuel("coal")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanilla_builds() {
        let catalog = vanilla().unwrap();
        assert!(catalog.contains(&"diamond_pickaxe".into()));
        assert_eq!(catalog.tiers().required(&"raw_iron".into()), 2);
        assert_eq!(
            catalog.heat().station_for(HeatKind::Furnace).map(|r| r.as_str()),
            Some("furnace")
        );
        assert!(catalog.heat().station_for(HeatKind::BlastFurnace).is_none());
    }

    #[test]
    fn test_iron_ingot_prefers_furnace() {
        let catalog = vanilla().unwrap();
        let method = catalog.default_method(&"iron_ingot".into()).unwrap();
        assert_eq!(method.step_type, StepType::Smelt);
        assert_eq!(catalog.methods_for(&"iron_ingot".into()).count(), 3);
    }
}
