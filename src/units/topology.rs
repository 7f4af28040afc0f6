//! Service topology unit: both services, their front doors and the wiring between them.
//!
//! The dependency ("world") service is declared and exposed first. The primary ("hello")
//! service receives the dependency's front-door address as `WORLD_SERVICE_URL` and is made to
//! wait for the dependency's listener and target registration, so the address is live before
//! the primary service starts.

use crate::error::DeployError;
use crate::model::{DeploymentName, ParameterKey, ServiceRole, UnitName, UnitTemplate, Value};
use crate::units::access::{AccessBoundary, Identities};
use crate::units::exposure::{DeclaredEndpoint, ExposureEndpoint};
use crate::units::foundation::NetworkFoundation;
use crate::units::service::{ServiceDescriptor, ServicePlacement};
use crate::units::telemetry::TelemetryIntegration;
use crate::units::{DeploymentUnit, UnitInputs};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ServiceTopologyProvisioner {
    deployment: DeploymentName,
    unit: UnitName,
    foundation: UnitName,
    access: AccessBoundary,
}

impl ServiceTopologyProvisioner {
    pub fn new(deployment: DeploymentName) -> Self {
        Self {
            unit: deployment.topology_unit(),
            foundation: deployment.foundation_unit(),
            deployment,
            access: AccessBoundary::shared(),
        }
    }

    pub fn access(&self) -> &AccessBoundary {
        &self.access
    }

    fn output_description(role: ServiceRole) -> &'static str {
        match role {
            ServiceRole::Primary => "Hello service ALB DNS name",
            ServiceRole::Dependency => "World service ALB DNS name",
        }
    }

    /// Output carrying the front-door address of `role`.
    pub fn address_output(role: ServiceRole) -> String {
        format!("{}ALBDNS", role.logical_prefix())
    }
}

impl DeploymentUnit for ServiceTopologyProvisioner {
    fn name(&self) -> &UnitName {
        &self.unit
    }

    fn imports(&self) -> Vec<ParameterKey> {
        ServiceRole::ALL
            .iter()
            .map(|role| self.deployment.registry_lookup_key(*role))
            .collect()
    }

    fn synthesize(&self, inputs: &UnitInputs) -> Result<UnitTemplate, DeployError> {
        let world_repository =
            inputs.parameter(&self.deployment.registry_lookup_key(ServiceRole::Dependency))?;
        let hello_repository =
            inputs.parameter(&self.deployment.registry_lookup_key(ServiceRole::Primary))?;
        let foundation = NetworkFoundation::from_inputs(inputs, &self.foundation)?;
        debug!(world_repository, hello_repository, cluster = %foundation.cluster_name, "Inputs resolved");

        let network = Value::literal(foundation.network_id.as_str());
        let cluster = Value::literal(foundation.cluster_name.as_str());
        let mut template = UnitTemplate::new(self.unit.clone());

        let identities = Identities::declare(&mut template)?;
        let security_group = self.access.declare(&mut template, network.clone())?;

        let mut front_doors = Vec::new();
        for role in ServiceRole::ALL {
            let front_door =
                ExposureEndpoint::declare_front_door(&mut template, role, &network, &security_group)?;
            front_doors.push((role, front_door));
        }
        let front_door = |role: ServiceRole| {
            front_doors
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, id)| id.clone())
                .ok_or_else(|| DeployError::configuration("topology", format!("no front door for {role:?}")))
        };
        let placement = ServicePlacement {
            cluster: &cluster,
            identities: &identities,
            security_group: &security_group,
        };

        let world = ServiceDescriptor::new(ServiceRole::Dependency, world_repository)
            .with_telemetry(TelemetryIntegration::java("world-service"))
            .declare(&mut template, placement, Vec::new())?;
        let world_endpoint = ExposureEndpoint::for_role(ServiceRole::Dependency).declare(
            &mut template,
            &front_door(ServiceRole::Dependency)?,
            &network,
            &world,
        )?;

        let hello = ServiceDescriptor::new(ServiceRole::Primary, hello_repository)
            .with_env("WORLD_SERVICE_URL", world_endpoint.base_url())
            .declare(
                &mut template,
                placement,
                vec![world_endpoint.listener.clone(), world_endpoint.attachment.clone()],
            )?;
        let hello_endpoint = ExposureEndpoint::for_role(ServiceRole::Primary).declare(
            &mut template,
            &front_door(ServiceRole::Primary)?,
            &network,
            &hello,
        )?;

        let endpoints: [(ServiceRole, &DeclaredEndpoint); 2] = [
            (ServiceRole::Dependency, &world_endpoint),
            (ServiceRole::Primary, &hello_endpoint),
        ];
        for (role, endpoint) in endpoints {
            template.output(
                Self::address_output(role),
                endpoint.address(),
                Self::output_description(role),
            )?;
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn inputs(provisioner: &ServiceTopologyProvisioner) -> UnitInputs {
        let deployment = DeploymentName::new("demo").unwrap();
        UnitInputs::new(provisioner.name().clone())
            .with_parameter(deployment.registry_lookup_key(ServiceRole::Primary), "demo-app")
            .with_parameter(deployment.registry_lookup_key(ServiceRole::Dependency), "demo-world-app")
            .with_outputs(
                deployment.foundation_unit(),
                BTreeMap::from([
                    ("NetworkId".to_string(), "vpc-00000001".to_string()),
                    ("ClusterName".to_string(), "demo-cluster".to_string()),
                ]),
            )
    }

    #[test]
    fn test_imports_both_registry_keys() {
        let provisioner = ServiceTopologyProvisioner::new(DeploymentName::new("demo").unwrap());
        let keys: Vec<String> = provisioner.imports().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["/demo/worldRepositoryName", "/demo/appRepositoryName"]);
    }

    #[test]
    fn test_declaration_order() {
        let provisioner = ServiceTopologyProvisioner::new(DeploymentName::new("demo").unwrap());
        let template = provisioner.synthesize(&inputs(&provisioner)).unwrap();
        let ids: Vec<&str> = template.resources().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "TaskExecutionRole",
                "TaskRole",
                "ServiceSecurityGroup",
                "WorldALB",
                "HelloALB",
                "WorldLogGroup",
                "WorldTaskDef",
                "WorldService",
                "WorldTargetGroup",
                "WorldTargetAttachment",
                "WorldListener",
                "HelloLogGroup",
                "HelloTaskDef",
                "HelloService",
                "HelloTargetGroup",
                "HelloTargetAttachment",
                "HelloListener",
            ]
        );
        let outputs: Vec<&str> = template.outputs().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(outputs, vec!["WorldALBDNS", "HelloALBDNS"]);
    }
}
