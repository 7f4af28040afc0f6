//! # Repository Actor
//!
//! The image registry. One [`Repository`] per registry name, holding the images pushed to it.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Repository`]
//! - [`error`] - [`RepositoryError`]
//! - [`actions`] - [`RepositoryAction`] / [`RepositoryActionResult`] for pushing and listing images
//! - [`new()`] - Factory for the actor and its client
//!
//! Deleting a repository deletes its images with it. Whether a unit deletes a repository at all
//! is decided by the repository's [`RemovalPolicy`], which the engine reads at teardown.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::RepositoryClient;
use crate::cloud::registry_host;
use crate::framework::ResourceActor;
use crate::model::RemovalPolicy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub tag: String,
    pub digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Repository {
    pub name: String,
    pub removal_policy: RemovalPolicy,
    pub images: Vec<Image>,
    #[serde(skip)]
    pushes: u32,
}

/// Payload for creating a repository.
#[derive(Debug, Clone)]
pub struct RepositoryCreate {
    pub name: String,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryUpdate {
    pub removal_policy: Option<RemovalPolicy>,
}

impl Repository {
    pub fn new(name: impl Into<String>, removal_policy: RemovalPolicy) -> Self {
        Self {
            name: name.into(),
            removal_policy,
            images: Vec::new(),
            pushes: 0,
        }
    }

    /// `{account}.dkr.ecr.{region}.amazonaws.com/{name}`
    pub fn uri(&self) -> String {
        format!("{}/{}", registry_host(), self.name)
    }

    pub fn arn(&self) -> String {
        format!(
            "arn:aws:ecr:{}:{}:repository/{}",
            crate::cloud::LOCAL_REGION,
            crate::cloud::LOCAL_ACCOUNT_ID,
            self.name
        )
    }

    pub fn image(&self, tag: &str) -> Option<&Image> {
        self.images.iter().find(|image| image.tag == tag)
    }
}

/// Creates a new Repository actor and its client.
pub fn new() -> (ResourceActor<Repository>, RepositoryClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, RepositoryClient::new(generic_client))
}
