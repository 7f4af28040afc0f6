//! # Deployment Units
//!
//! A unit is an independently provisionable bundle of resources. Units never talk to the
//! engine: they turn their [`UnitInputs`] into a [`UnitTemplate`] and the
//! [`Deployment`](crate::lifecycle::Deployment) evaluator does the rest.
//!
//! | Unit | Name | Imports | Exports |
//! |---|---|---|---|
//! | [`RegistryProvisioner`] | `{D}-docker` | | repository names as parameters, repository URIs |
//! | [`FoundationProvisioner`] | `{D}-cluster` | | `NetworkId`, `ClusterName` |
//! | [`ServiceTopologyProvisioner`] | `{D}-app` | both repository parameters, foundation outputs | `WorldALBDNS`, `HelloALBDNS` |
//!
//! The building blocks the topology is assembled from live beside it: [`access`],
//! [`service`], [`telemetry`] and [`exposure`].

pub mod access;
pub mod exposure;
pub mod foundation;
pub mod registry;
pub mod service;
pub mod telemetry;
pub mod topology;

pub use access::{AccessBoundary, Identities, FRONT_DOOR_PORT, SERVICE_PORT};
pub use exposure::{DeclaredEndpoint, ExposureEndpoint};
pub use foundation::{FoundationProvisioner, NetworkFoundation};
pub use registry::{RegistryHandle, RegistryProvisioner};
pub use service::{DeclaredService, ServiceDescriptor, ServicePlacement};
pub use telemetry::TelemetryIntegration;
pub use topology::ServiceTopologyProvisioner;

use crate::error::DeployError;
use crate::model::{ParameterKey, UnitName, UnitTemplate};
use std::collections::BTreeMap;

/// Everything a unit may read while synthesizing: published parameters it imports and the
/// outputs of the units it depends on.
#[derive(Debug, Clone)]
pub struct UnitInputs {
    unit: UnitName,
    parameters: BTreeMap<ParameterKey, String>,
    outputs: BTreeMap<UnitName, BTreeMap<String, String>>,
}

impl UnitInputs {
    pub fn new(unit: UnitName) -> Self {
        Self {
            unit,
            parameters: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: ParameterKey, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value.into());
        self
    }

    pub fn with_outputs(mut self, unit: UnitName, outputs: BTreeMap<String, String>) -> Self {
        self.outputs.insert(unit, outputs);
        self
    }

    /// A published parameter. Absent keys mean the producing unit has not completed.
    pub fn parameter(&self, key: &ParameterKey) -> Result<&str, DeployError> {
        self.parameters
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| DeployError::Resolution {
                unit: self.unit.clone(),
                key: key.clone(),
            })
    }

    /// An output of a unit this one depends on.
    pub fn output(&self, unit: &UnitName, name: &str) -> Result<&str, DeployError> {
        self.outputs
            .get(unit)
            .and_then(|outputs| outputs.get(name))
            .map(String::as_str)
            .ok_or_else(|| {
                DeployError::configuration(
                    format!("inputs of {}", self.unit),
                    format!("output `{name}` of unit `{unit}` is not available"),
                )
            })
    }
}

/// One independently provisionable unit.
pub trait DeploymentUnit: Send + Sync {
    fn name(&self) -> &UnitName;

    /// Parameter keys read during synthesis. The evaluator fetches them from the engine.
    fn imports(&self) -> Vec<ParameterKey> {
        Vec::new()
    }

    /// Builds the desired state. Performs no I/O.
    fn synthesize(&self, inputs: &UnitInputs) -> Result<UnitTemplate, DeployError>;
}
