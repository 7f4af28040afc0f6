//! Deterministic naming.
//!
//! Every resource name and lookup key in a deployment derives from one [`DeploymentName`].
//! The derivations live here so units never format names themselves.

use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Used when no deployment name is configured.
pub const DEFAULT_DEPLOYMENT_NAME: &str = "appsignals-ecs-demo";

const MAX_DEPLOYMENT_NAME_LEN: usize = 64;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Name of a deployment unit, e.g. `demo-docker`.
    UnitName
);
string_id!(
    /// Key of a cross-unit parameter, e.g. `/demo/appRepositoryName`.
    ParameterKey
);
string_id!(
    /// Identifier of a resource inside one unit template, e.g. `WorldALB`.
    LogicalId
);

/// The one external input; prefixes nearly every name in the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeploymentName(String);

impl DeploymentName {
    /// Validates `raw`: 1..=64 chars, a leading lowercase letter, then lowercase letters,
    /// digits and `-`, not ending in `-`.
    pub fn new(raw: impl Into<String>) -> Result<Self, DeployError> {
        let raw = raw.into();
        let invalid = |reason: &str| DeployError::Configuration {
            context: "deployment name".to_string(),
            message: format!("`{raw}` {reason}"),
        };

        if raw.is_empty() || raw.len() > MAX_DEPLOYMENT_NAME_LEN {
            return Err(invalid("must be between 1 and 64 characters"));
        }
        if !raw.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(invalid("must start with a lowercase letter"));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid("may only contain lowercase letters, digits and '-'"));
        }
        if raw.ends_with('-') {
            return Err(invalid("must not end with '-'"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn registry_unit(&self) -> UnitName {
        UnitName(format!("{}-docker", self.0))
    }

    pub fn foundation_unit(&self) -> UnitName {
        UnitName(format!("{}-cluster", self.0))
    }

    pub fn topology_unit(&self) -> UnitName {
        UnitName(format!("{}-app", self.0))
    }

    /// `{D}-app` for the primary service, `{D}-world-app` for the dependency.
    pub fn registry_name(&self, role: ServiceRole) -> String {
        format!("{}-{}", self.0, role.registry_suffix())
    }

    /// `/{D}/appRepositoryName` or `/{D}/worldRepositoryName`.
    pub fn registry_lookup_key(&self, role: ServiceRole) -> ParameterKey {
        ParameterKey(format!("/{}/{}", self.0, role.lookup_key_stem()))
    }

    pub fn cluster_name(&self) -> String {
        format!("{}-cluster", self.0)
    }
}

impl Default for DeploymentName {
    fn default() -> Self {
        Self(DEFAULT_DEPLOYMENT_NAME.to_string())
    }
}

impl FromStr for DeploymentName {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two services of the topology.
///
/// `Dependency` ("world") is constructed first; `Primary` ("hello") receives its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    Primary,
    Dependency,
}

impl ServiceRole {
    /// Construction order.
    pub const ALL: [ServiceRole; 2] = [ServiceRole::Dependency, ServiceRole::Primary];

    /// Application name handed to the container as `SPRING_APPLICATION_NAME`.
    pub fn app_name(self) -> &'static str {
        match self {
            ServiceRole::Primary => "hello",
            ServiceRole::Dependency => "world",
        }
    }

    /// Prefix of every logical id the topology unit declares for this service.
    pub fn logical_prefix(self) -> &'static str {
        match self {
            ServiceRole::Primary => "Hello",
            ServiceRole::Dependency => "World",
        }
    }

    /// Prefix of the registry unit's logical ids and parameter names.
    pub fn registry_prefix(self) -> &'static str {
        match self {
            ServiceRole::Primary => "app",
            ServiceRole::Dependency => "world",
        }
    }

    fn registry_suffix(self) -> &'static str {
        match self {
            ServiceRole::Primary => "app",
            ServiceRole::Dependency => "world-app",
        }
    }

    fn lookup_key_stem(self) -> &'static str {
        match self {
            ServiceRole::Primary => "appRepositoryName",
            ServiceRole::Dependency => "worldRepositoryName",
        }
    }
}

impl Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_name())
    }
}
