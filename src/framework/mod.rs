//! Generic actor runtime for resource management.
//!
//! The simulated cloud services behind [`LocalEngine`](crate::engine::LocalEngine) are all
//! built from these pieces: one [`ResourceActor`] per service, owning its store and processing
//! requests sequentially, and a cloneable [`ResourceClient`] for talking to it.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that manages entities
//! - [`ResourceClient`] - Type-safe client half of the actor
//! - [`ActorClient`] - Shared `get` / `delete` / `list` for typed client wrappers
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
