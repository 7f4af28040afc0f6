//! Process configuration.
//!
//! The deployment name is the only external input. It is read once at startup and then
//! threaded explicitly into every unit.

use crate::error::DeployError;
use crate::model::DeploymentName;

/// Environment variable naming the deployment.
pub const DEPLOYMENT_NAME_VAR: &str = "STACK_NAME";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployConfig {
    pub deployment: DeploymentName,
}

impl DeployConfig {
    pub fn new(deployment: DeploymentName) -> Self {
        Self { deployment }
    }

    pub fn from_env() -> Result<Self, DeployError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// An explicit name wins; otherwise the environment decides.
    pub fn from_flag_or_env(flag: Option<&str>) -> Result<Self, DeployError> {
        match flag {
            Some(name) => Self::from_lookup(|_| Some(name.to_string())),
            None => Self::from_env(),
        }
    }

    /// Reads the deployment name through `lookup`. Unset or empty falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeployError> {
        let deployment = match lookup(DEPLOYMENT_NAME_VAR) {
            Some(raw) if !raw.trim().is_empty() => DeploymentName::new(raw.trim())?,
            _ => DeploymentName::default(),
        };
        Ok(Self { deployment })
    }
}
