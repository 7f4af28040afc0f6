//! Deployment orchestration and process-level setup.
//!
//! - [`Deployment`] - The unit graph, its evaluator and teardown
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod deployment;
pub mod tracing;

pub use deployment::*;
pub use tracing::*;
