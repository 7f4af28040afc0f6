//! # Provisioning Engine
//!
//! The contract between the deployment units and whatever realizes their templates.
//!
//! Units only ever *describe* desired state. An engine takes a [`UnitTemplate`], reconciles
//! live state to match it and reports what it changed. Readiness waits, rollback of a failed
//! attempt and teardown ordering all belong to the engine.
//!
//! [`LocalEngine`] is the in-process implementation: simulated cloud services built from
//! resource actors, used by the CLI and the test-suite.

pub mod local;

pub use local::*;

use crate::model::{LogicalId, ParameterKey, ResourceKind, UnitName, UnitTemplate};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// A resource with the same physical name already exists outside this unit.
    #[error("{kind} `{name}` already exists and is not owned by this unit")]
    Collision { kind: ResourceKind, name: String },

    #[error("`{resource}` refers to `{target}.{attribute}`, which is not available")]
    UnresolvedReference {
        resource: LogicalId,
        target: LogicalId,
        attribute: String,
    },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The backing service refused the operation.
    #[error("{operation} of `{resource}` rejected: {reason}")]
    Rejected {
        resource: LogicalId,
        operation: Operation,
        reason: String,
    },

    #[error("Backend unavailable: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Create,
    Update,
    /// Physical name changed: a new resource was created and the old one deleted.
    Replace,
    Delete,
    NoChange,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub logical_id: LogicalId,
    pub kind: ChangeKind,
}

/// Result of deploying one unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitReport {
    pub changes: Vec<Change>,
    /// Resolved outputs by name.
    pub outputs: BTreeMap<String, String>,
}

impl UnitReport {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|change| change.kind == kind).count()
    }

    /// Whether anything other than `NoChange` happened.
    pub fn changed(&self) -> bool {
        self.changes.iter().any(|change| change.kind != ChangeKind::NoChange)
    }
}

/// Result of destroying one unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeardownReport {
    pub deleted: Vec<LogicalId>,
    /// Resources left in place by their removal policy, with their physical names.
    pub retained: Vec<(LogicalId, String)>,
}

#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Reconciles live state of `template.unit()` to match `template`.
    async fn deploy(&self, template: &UnitTemplate) -> Result<UnitReport, ProvisioningError>;

    /// Removes everything the unit owns. Destroying an unknown unit is a no-op.
    async fn destroy(&self, unit: &UnitName) -> Result<TeardownReport, ProvisioningError>;

    /// Reads a published cross-unit parameter.
    async fn read_parameter(&self, key: &ParameterKey) -> Result<Option<String>, ProvisioningError>;
}
