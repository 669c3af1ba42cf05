//! System wiring: slot actor, job runner and scheduler.

pub mod crafting_system;
mod runner;

pub use crafting_system::CraftingSystem;
pub use runner::HopOutcome;
