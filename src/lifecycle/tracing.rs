//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate. Call it once,
//! at process start.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`); log lines carry
//! structured fields (`entity_type`, `unit`, `resource`) instead.
//!
//! ```bash
//! # Unit and resource changes
//! RUST_LOG=info stack-deploy deploy
//!
//! # Full payloads of every simulated cloud request
//! RUST_LOG=debug stack-deploy deploy
//!
//! # Only the simulated cloud services
//! RUST_LOG=stack_deploy::framework=debug stack-deploy deploy
//! ```
//!
//! ## What Gets Traced
//!
//! - **Units**: each unit is evaluated inside a `unit` span; the evaluator logs when a unit is
//!   committed, fails, or leaves retained resources behind on teardown.
//! - **Resources**: the engine logs one `Reconciled` line per resource with its change kind.
//! - **Cloud services**: actor startup, shutdown and every create, update, delete and action.
//!
//! ## Example
//!
//! With `RUST_LOG=info`:
//!
//! ```text
//! INFO Deploying deployment=demo waves=2
//! INFO unit: Reconciled resource=appRepository kind=Create
//! INFO unit: Committed created=4 updated=0 replaced=0 deleted=0
//! INFO unit: Reconciled resource=Vpc kind=Create
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Structured fields identify the source instead
        .compact() // Compact format shows spans inline (e.g., "unit:")
        .init();
}
