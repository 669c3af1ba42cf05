//! Type-safe wrappers around [`SlotClient`](job_slot::SlotClient).

pub mod job_client;

pub use job_client::*;
