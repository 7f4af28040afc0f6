//! Error types for the CloudObject actor.

use crate::cloud::RepositoryError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CloudObjectError {
    #[error("Cloud object not found: {0}")]
    NotFound(String),

    #[error("Invalid {kind} `{logical_id}`: {reason}")]
    InvalidSpec {
        kind: String,
        logical_id: String,
        reason: String,
    },

    #[error("Image repository not found: {0}")]
    ImageRepositoryNotFound(String),

    #[error("`{0}` is not a load balancer target")]
    NotATarget(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CloudObjectError {
    fn from(msg: String) -> Self {
        CloudObjectError::ActorCommunicationError(msg)
    }
}
