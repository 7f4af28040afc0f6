//! Error types for the Parameter actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterError {
    #[error("Parameter not found: {0}")]
    NotFound(String),

    #[error("Parameter already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid parameter `{key}`: {reason}")]
    Invalid { key: String, reason: String },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ParameterError {
    fn from(msg: String) -> Self {
        ParameterError::ActorCommunicationError(msg)
    }
}
