//! # Craft Planner
//!
//! > **Turns "get me N of X" into a chain of jobs an actor can run.**
//!
//! A request is decomposed into a tree of production steps (crafting,
//! heat-processing, mining, gathering, farming, fishing, hunting), checked
//! against what the actor owns, topped up with the tools, stations and fuel
//! the steps need, and executed one long-running job at a time. Each job
//! carries a continuation; when it completes the continuation is handed back
//! and the request is re-planned from the actor's current stock.
//!
//! ## Pipeline
//!
//! ```text
//! request -> StockSnapshot -> Resolver -> Plan (compiler) -> Injector -> Scheduler
//!                                 tree      ordered steps     + prereqs    job + continuation
//! ```
//!
//! ## Module Tour
//!
//! ### 1. Data ([`model`], [`catalog`], [`stock`])
//! - **Role**: what exists, how it is made, and what the actor owns right now.
//! - **Key items**: [`RecipeCatalog`](catalog::RecipeCatalog),
//!   [`Stock`](stock::Stock), [`StockSnapshot`](stock::StockSnapshot).
//!
//! ### 2. Planning ([`resolver`], [`compiler`], [`injector`])
//! All synchronous, all deterministic for a given catalog and stock.
//! - **Key items**: [`Resolver`](resolver::Resolver),
//!   [`Plan`](compiler::Plan), [`Injector`](injector::Injector).
//!
//! ### 3. Execution ([`scheduler`], [`job`], [`clients`])
//! - **Role**: assembles what can be crafted now, queues the first job on
//!   the actor's single slot and resumes when it completes.
//! - **Key items**: [`Scheduler`](scheduler::Scheduler),
//!   [`Continuation`](scheduler::Continuation), [`JobClient`](clients::JobClient).
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: spins up the slot actor and a simulated job runner and wires
//!   them to the scheduler.
//! - **Key items**: [`CraftingSystem`](lifecycle::CraftingSystem).
//!
//! ## Errors
//!
//! Not being able to make something is an answer, not an error: it comes
//! back as [`PlanResult::MissingIngredients`](scheduler::PlanResult).
//! [`PlannerError`](error::PlannerError) is for a dead queue, a bad catalog
//! or a bad configuration.
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod catalog;
pub mod clients;
pub mod compiler;
pub mod config;
pub mod error;
pub mod injector;
pub mod job;
pub mod lifecycle;
pub mod model;
pub mod resolver;
pub mod scheduler;
pub mod stock;
