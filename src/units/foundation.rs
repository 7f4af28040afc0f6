//! Foundation unit: the shared network and compute cluster.

use crate::error::DeployError;
use crate::model::{Attribute, DeploymentName, ResourceSpec, UnitName, UnitTemplate, Value};
use crate::units::{DeploymentUnit, UnitInputs};

const NETWORK_OUTPUT: &str = "NetworkId";
const CLUSTER_OUTPUT: &str = "ClusterName";

/// Read-only handles other units borrow from the foundation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFoundation {
    pub network_id: String,
    pub cluster_name: String,
}

impl NetworkFoundation {
    /// Reads the handles from the foundation unit's outputs.
    pub fn from_inputs(inputs: &UnitInputs, foundation: &UnitName) -> Result<Self, DeployError> {
        Ok(Self {
            network_id: inputs.output(foundation, NETWORK_OUTPUT)?.to_string(),
            cluster_name: inputs.output(foundation, CLUSTER_OUTPUT)?.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FoundationProvisioner {
    deployment: DeploymentName,
    unit: UnitName,
}

impl FoundationProvisioner {
    pub fn new(deployment: DeploymentName) -> Self {
        Self {
            unit: deployment.foundation_unit(),
            deployment,
        }
    }
}

impl DeploymentUnit for FoundationProvisioner {
    fn name(&self) -> &UnitName {
        &self.unit
    }

    fn synthesize(&self, _inputs: &UnitInputs) -> Result<UnitTemplate, DeployError> {
        let mut template = UnitTemplate::new(self.unit.clone());
        // Public subnets only; tasks reach the registry through their public IPs.
        let network = template.add(
            "Vpc",
            ResourceSpec::Network {
                cidr: "10.0.0.0/16".to_string(),
                max_azs: 2,
                nat_gateways: 0,
            },
        )?;
        let cluster = template.add(
            "Cluster",
            ResourceSpec::Cluster {
                cluster_name: self.deployment.cluster_name(),
                network: Value::attr(&network, Attribute::Id),
            },
        )?;
        template.output(NETWORK_OUTPUT, Value::attr(&network, Attribute::Id), "Shared network")?;
        template.output(CLUSTER_OUTPUT, Value::attr(&cluster, Attribute::Name), "Shared cluster")?;
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_network_and_cluster() {
        let provisioner = FoundationProvisioner::new(DeploymentName::new("demo").unwrap());
        let template = provisioner
            .synthesize(&UnitInputs::new(provisioner.name().clone()))
            .unwrap();
        assert_eq!(template.unit().as_str(), "demo-cluster");
        assert_eq!(template.resources().len(), 2);
        assert_eq!(template.resources()[1].spec.physical_name(), Some("demo-cluster"));
        let outputs: Vec<&str> = template.outputs().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(outputs, vec!["NetworkId", "ClusterName"]);
    }

    #[test]
    fn test_handles_from_outputs() {
        let foundation = UnitName::new("demo-cluster");
        let outputs = BTreeMap::from([
            ("NetworkId".to_string(), "vpc-00000001".to_string()),
            ("ClusterName".to_string(), "demo-cluster".to_string()),
        ]);
        let inputs = UnitInputs::new(UnitName::new("demo-app")).with_outputs(foundation.clone(), outputs);
        let handles = NetworkFoundation::from_inputs(&inputs, &foundation).unwrap();
        assert_eq!(handles.network_id, "vpc-00000001");

        let missing = UnitInputs::new(UnitName::new("demo-app"));
        assert!(matches!(
            NetworkFoundation::from_inputs(&missing, &foundation),
            Err(DeployError::Configuration { .. })
        ));
    }
}
