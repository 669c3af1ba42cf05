//! # Model
//!
//! Plain data types shared by every planning stage. Nothing in here knows about
//! stock, catalogs or queues.
//!
//! - [`ResourceId`] / [`Resource`] - what can be acquired
//! - [`ProductionMethod`] / [`InputSlot`] - how it is produced
//! - [`StepType`] / [`Step`] - one unit of planned work
//! - [`ActorId`] - who owns the inventory and performs jobs

pub mod method;
pub mod resource;
pub mod step;

pub use method::*;
pub use resource::*;
pub use step::*;
