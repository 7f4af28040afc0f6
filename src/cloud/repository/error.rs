//! Error types for the Repository actor.

use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RepositoryError {
    #[error("Repository not found: {0}")]
    NotFound(String),

    /// A repository with this name already exists.
    #[error("Repository already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid repository name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid image tag: {0:?}")]
    InvalidTag(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for RepositoryError {
    fn from(msg: String) -> Self {
        RepositoryError::ActorCommunicationError(msg)
    }
}
