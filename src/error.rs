//! # Deployment Errors
//!
//! The operator-facing error taxonomy. Every failure that aborts a deployment is one of three
//! kinds and always names the unit it happened in (or the input it concerns).

use crate::engine::ProvisioningError;
use crate::model::{ParameterKey, UnitName};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    /// A required input is missing or invalid: a bad deployment name, an absent foundation
    /// handle, a malformed template or a cyclic unit graph.
    #[error("Configuration error ({context}): {message}")]
    Configuration { context: String, message: String },

    /// A cross-unit parameter has not been published, usually because the producing unit has
    /// not completed.
    #[error("Resolution error in unit `{unit}`: parameter `{key}` is not published")]
    Resolution { unit: UnitName, key: ParameterKey },

    /// The provisioning engine rejected or failed to realize a resource.
    #[error("Provisioning error in unit `{unit}`: {source}")]
    Provisioning {
        unit: UnitName,
        #[source]
        source: ProvisioningError,
    },
}

impl DeployError {
    pub fn configuration(context: impl Into<String>, message: impl Into<String>) -> Self {
        DeployError::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }

    /// The unit the error happened in, when it happened inside one.
    pub fn unit(&self) -> Option<&UnitName> {
        match self {
            DeployError::Configuration { .. } => None,
            DeployError::Resolution { unit, .. } | DeployError::Provisioning { unit, .. } => {
                Some(unit)
            }
        }
    }
}
