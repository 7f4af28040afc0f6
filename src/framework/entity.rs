//! # ActorEntity Trait
//!
//! The contract every simulated cloud resource (repository, parameter, cloud object) implements
//! to be managed by the generic [`ResourceActor`](crate::framework::ResourceActor).
//!
//! # Keys
//! Entities choose their own key through [`ActorEntity::assign_id`]. Sequence-keyed entities
//! (cloud objects) turn the actor's counter into an id; name-keyed entities (repositories,
//! parameters) derive the key from the create payload, which lets the actor reject a second
//! create for the same name with [`FrameworkError::AlreadyExists`](crate::framework::FrameworkError::AlreadyExists).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! Both default to `Ok(())`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are async and receive the `Context` passed to `run()`, so dependencies (other
/// clients) are bound late, after every actor has been constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The key entities are stored under.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations beyond CRUD.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per actor, shared by every hook.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Derive the key for a new entity. `seq` starts at 1 and increments on every create.
    fn assign_id(seq: u32, params: &Self::Create) -> Self::Id;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
