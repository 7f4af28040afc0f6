//! # Simulated Cloud Services
//!
//! The external collaborators a deployment talks to, each run as a
//! [`ResourceActor`](crate::framework::ResourceActor):
//!
//! | Service | Entity | Keyed by | Context |
//! |---|---|---|---|
//! | Image registry | [`Repository`] | repository name | `()` |
//! | Parameter store | [`Parameter`] | parameter key | `()` |
//! | Everything else (network, cluster, IAM, ELB, ECS, logs) | [`CloudObject`] | sequence | [`RepositoryClient`](crate::clients::RepositoryClient) |
//!
//! Name-keyed services reject a second create for a taken name, which is how collisions with
//! resources outside a unit surface. The cloud-object service checks that task definitions only
//! pull from registries that exist.

pub mod object;
pub mod parameter;
pub mod repository;

pub use object::{
    CloudObject, CloudObjectAction, CloudObjectActionResult, CloudObjectCreate, CloudObjectError,
    CloudObjectUpdate, ObjectId, DEFAULT_HEALTH_RESPONSE,
};
pub use parameter::{Parameter, ParameterCreate, ParameterError, ParameterTier, ParameterUpdate};
pub use repository::{
    Image, Repository, RepositoryAction, RepositoryActionResult, RepositoryCreate,
    RepositoryError, RepositoryUpdate,
};

/// Region reported by the local services.
pub const LOCAL_REGION: &str = "local-1";

/// Account reported by the local services.
pub const LOCAL_ACCOUNT_ID: &str = "000000000000";

/// Host part of every image reference served by the local registry.
pub fn registry_host() -> String {
    format!("{LOCAL_ACCOUNT_ID}.dkr.ecr.{LOCAL_REGION}.amazonaws.com")
}
