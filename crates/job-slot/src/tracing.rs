//! # Observability
//!
//! Installs the `tracing-subscriber` used by binaries built on this crate.
//!
//! The slot actor logs every transition with structured fields:
//!
//! ```text
//! INFO Slot actor started entity_type="CraftJob"
//! INFO Enqueued entity_type="CraftJob" owner=steve id=task_1 task="chop 3 oak_log" chained=true
//! INFO Completed entity_type="CraftJob" owner=steve id=task_1 active=0
//! WARN Slot busy entity_type="CraftJob" owner=steve active=task_2
//! ```
//!
//! Verbosity comes from `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run            # transitions only
//! RUST_LOG=debug cargo run           # full task payloads
//! RUST_LOG=job_slot=debug cargo run  # queue internals only
//! ```

/// Initializes a compact fmt subscriber filtered by `RUST_LOG`.
///
/// Call once per process; a second call panics inside `tracing-subscriber`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
