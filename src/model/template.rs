//! Unit templates: the desired state one unit hands to the provisioning engine.

use crate::error::DeployError;
use crate::model::graph::DependencyGraph;
use crate::model::naming::{LogicalId, UnitName};
use crate::model::resource::{Resource, ResourceSpec};
use crate::model::value::Value;
use serde::{Deserialize, Serialize};

/// A named value the unit exports once deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub value: Value,
    pub description: String,
}

/// Resources in declaration order plus outputs.
///
/// A resource may only reference resources declared before it, so the declaration order is
/// always a valid creation order and the template can never contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    unit: UnitName,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
}

impl UnitTemplate {
    pub fn new(unit: UnitName) -> Self {
        Self {
            unit,
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn unit(&self) -> &UnitName {
        &self.unit
    }

    pub fn add(&mut self, id: impl Into<LogicalId>, spec: ResourceSpec) -> Result<LogicalId, DeployError> {
        self.add_with_deps(id, spec, Vec::new())
    }

    /// Declares a resource that must also wait for `depends_on`.
    pub fn add_with_deps(
        &mut self,
        id: impl Into<LogicalId>,
        spec: ResourceSpec,
        depends_on: Vec<LogicalId>,
    ) -> Result<LogicalId, DeployError> {
        let resource = Resource {
            id: id.into(),
            spec,
            depends_on,
        };
        if self.get(&resource.id).is_some() {
            return Err(self.invalid(format!("duplicate logical id `{}`", resource.id)));
        }
        if let Some(missing) = resource
            .dependencies()
            .into_iter()
            .find(|dep| self.get(dep).is_none())
        {
            return Err(self.invalid(format!(
                "`{}` refers to `{missing}`, which is not declared before it",
                resource.id
            )));
        }
        let id = resource.id.clone();
        self.resources.push(resource);
        Ok(id)
    }

    pub fn output(
        &mut self,
        name: impl Into<String>,
        value: Value,
        description: impl Into<String>,
    ) -> Result<(), DeployError> {
        let name = name.into();
        if self.outputs.iter().any(|output| output.name == name) {
            return Err(self.invalid(format!("duplicate output `{name}`")));
        }
        if let Some(missing) = value.references().into_iter().find(|dep| self.get(dep).is_none()) {
            return Err(self.invalid(format!("output `{name}` refers to unknown `{missing}`")));
        }
        self.outputs.push(Output {
            name,
            value,
            description: description.into(),
        });
        Ok(())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.iter().find(|resource| &resource.id == id)
    }

    /// Declaration index of `id`.
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.resources.iter().position(|resource| &resource.id == id)
    }

    pub fn graph(&self) -> Result<DependencyGraph<LogicalId>, DeployError> {
        let mut graph = DependencyGraph::new();
        for resource in &self.resources {
            graph.add_node(resource.id.clone());
        }
        for resource in &self.resources {
            for dependency in resource.dependencies() {
                graph
                    .add_edge(&resource.id, dependency)
                    .map_err(|e| self.invalid(e.to_string()))?;
            }
        }
        Ok(graph)
    }

    /// Resources ordered so that every dependency comes first.
    pub fn creation_order(&self) -> Result<Vec<&Resource>, DeployError> {
        let order = self.graph()?.order().map_err(|e| self.invalid(e.to_string()))?;
        Ok(order.iter().filter_map(|id| self.get(id)).collect())
    }

    fn invalid(&self, message: String) -> DeployError {
        DeployError::configuration(format!("template {}", self.unit), message)
    }
}
