//! # stack-deploy
//!
//! Declarative deployment of two containerized web services, each behind its own
//! internet-facing front door, where the primary ("hello") service is configured with the
//! public address of the dependency ("world") service.
//!
//! ## Design
//!
//! The deployment is split into three independently provisionable units:
//!
//! 1. a **registry** unit holding one image repository per service, whose names are published
//!    as cross-unit parameters,
//! 2. a **foundation** unit holding the shared network and cluster,
//! 3. a **service topology** unit that reads both and assembles the services.
//!
//! Units only describe desired state ([`UnitTemplate`](model::UnitTemplate)s). The
//! [`Deployment`](lifecycle::Deployment) evaluator orders them as a DAG and hands each
//! template to a [`ProvisioningEngine`](engine::ProvisioningEngine), which reconciles live
//! state, rolls back failed attempts and tears units down again.
//!
//! ### Construction order inside a unit
//! A resource may only reference resources declared before it. The primary service refers to
//! the dependency's front-door address, so the dependency service and its endpoint are always
//! realized first.
//!
//! ### The local cloud
//! [`LocalEngine`](engine::LocalEngine) realizes templates against simulated cloud services.
//! Each service is a resource actor from [`framework`]: an isolated store in its own Tokio
//! task, reached through a typed client from [`clients`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`] - Naming, references, the resource catalogue, templates and the dependency graph.
//! - [`units`] - The three deployment units and the building blocks they are assembled from.
//! - [`lifecycle`] - The deployment evaluator and tracing setup.
//! - [`engine`] - The provisioning-engine contract and the local engine.
//! - [`cloud`] - Simulated image registry, parameter store and cloud control.
//! - [`clients`] - Typed clients for the simulated services.
//! - [`framework`] - The generic resource-actor runtime.
//! - [`config`], [`error`] - Process configuration and the error taxonomy.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- --deployment demo deploy --teardown
//! cargo test
//! ```

pub mod clients;
pub mod cloud;
pub mod config;
pub mod engine;
pub mod error;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod units;
