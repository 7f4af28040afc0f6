//! # Parameter Actor
//!
//! The shared key/value store units publish cross-unit values into. Keyed by [`ParameterKey`];
//! a create for a key that is already published is refused.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::ParameterClient;
use crate::framework::ResourceActor;
use crate::model::ParameterKey;
pub use crate::model::ParameterTier;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub key: ParameterKey,
    pub value: String,
    pub description: String,
    pub tier: ParameterTier,
    /// Starts at 1 and increments on every update.
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct ParameterCreate {
    pub key: ParameterKey,
    pub value: String,
    pub description: String,
    pub tier: ParameterTier,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterUpdate {
    pub value: Option<String>,
    pub description: Option<String>,
}

/// Creates a new Parameter actor and its client.
pub fn new() -> (ResourceActor<Parameter>, ParameterClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, ParameterClient::new(generic_client))
}
