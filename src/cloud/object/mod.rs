//! # Cloud Object Actor
//!
//! Every resource kind that is neither a repository nor a parameter: networks, clusters,
//! identities, security groups, load balancers, target groups, listeners, log groups, task
//! definitions, services and target attachments.
//!
//! Objects are keyed by sequence and store their **resolved** spec (no references left) plus the
//! attributes they expose to later resources. The actor's context is a
//! [`RepositoryClient`](crate::clients::RepositoryClient): task definitions may only pull images from repositories that exist.

pub mod actions;
pub mod attributes;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CloudObjectClient;
use crate::framework::ResourceActor;
use crate::model::{Attribute, LogicalId, ResourceKind, ResourceSpec, UnitName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Type-safe identifier for cloud objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub u32);

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{:08x}", self.0)
    }
}

/// Status a service answers health probes with until told otherwise.
pub const DEFAULT_HEALTH_RESPONSE: u16 = 200;

#[derive(Debug, Clone, Serialize)]
pub struct CloudObject {
    pub id: ObjectId,
    pub unit: UnitName,
    pub logical_id: LogicalId,
    pub spec: ResourceSpec,
    pub attributes: BTreeMap<Attribute, String>,
    pub revision: u32,
    /// Only services answer probes.
    pub health_response: Option<u16>,
}

impl CloudObject {
    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        self.attributes.get(&attribute).map(String::as_str)
    }
}

/// Payload for creating a cloud object. `spec` must already be resolved.
#[derive(Debug, Clone)]
pub struct CloudObjectCreate {
    pub unit: UnitName,
    pub logical_id: LogicalId,
    pub spec: ResourceSpec,
}

/// Replaces the resolved spec in place. The kind must not change.
#[derive(Debug, Clone)]
pub struct CloudObjectUpdate {
    pub spec: ResourceSpec,
}

/// Creates a new CloudObject actor and its client.
///
/// Run it with the [`RepositoryClient`](crate::clients::RepositoryClient) of the registry it should validate images against.
pub fn new() -> (ResourceActor<CloudObject>, CloudObjectClient) {
    let (actor, generic_client) = ResourceActor::new(64);
    (actor, CloudObjectClient::new(generic_client))
}
