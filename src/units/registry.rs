//! Registry unit: one image repository per service, each published under a lookup key.

use crate::error::DeployError;
use crate::model::{
    Attribute, DeploymentName, LogicalId, ParameterKey, ParameterTier, RemovalPolicy,
    ResourceSpec, ServiceRole, UnitName, UnitTemplate, Value,
};
use crate::units::{DeploymentUnit, UnitInputs};

/// Identifies one image repository across units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryHandle {
    pub role: ServiceRole,
    pub logical_id: LogicalId,
    pub repository_name: String,
    /// Where the repository name is published.
    pub lookup_key: ParameterKey,
    /// Output carrying the repository URI once deployed.
    pub uri_output: String,
}

#[derive(Debug, Clone)]
pub struct RegistryProvisioner {
    deployment: DeploymentName,
    unit: UnitName,
    removal_policy: RemovalPolicy,
}

impl RegistryProvisioner {
    /// Repositories are destroyed together with their images on teardown.
    pub fn new(deployment: DeploymentName) -> Self {
        Self {
            unit: deployment.registry_unit(),
            deployment,
            removal_policy: RemovalPolicy::Destroy,
        }
    }

    /// Keeps repositories (and their images) when the unit is torn down.
    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    pub fn handle(&self, role: ServiceRole) -> RegistryHandle {
        let prefix = role.registry_prefix();
        RegistryHandle {
            role,
            logical_id: LogicalId::new(format!("{prefix}Repository")),
            repository_name: self.deployment.registry_name(role),
            lookup_key: self.deployment.registry_lookup_key(role),
            uri_output: format!("{prefix}RepositoryURI"),
        }
    }

    /// Primary first, matching declaration order.
    pub fn handles(&self) -> Vec<RegistryHandle> {
        [ServiceRole::Primary, ServiceRole::Dependency]
            .into_iter()
            .map(|role| self.handle(role))
            .collect()
    }
}

fn parameter_description(role: ServiceRole) -> &'static str {
    match role {
        ServiceRole::Primary => "The app repository name",
        ServiceRole::Dependency => "The world app repository name",
    }
}

fn uri_description(role: ServiceRole) -> &'static str {
    match role {
        ServiceRole::Primary => "The app URI of the ECR repository",
        ServiceRole::Dependency => "The world app URI of the ECR repository",
    }
}

impl DeploymentUnit for RegistryProvisioner {
    fn name(&self) -> &UnitName {
        &self.unit
    }

    fn synthesize(&self, _inputs: &UnitInputs) -> Result<UnitTemplate, DeployError> {
        let mut template = UnitTemplate::new(self.unit.clone());
        let handles = self.handles();

        for handle in &handles {
            template.add(
                handle.logical_id.clone(),
                ResourceSpec::ImageRepository {
                    repository_name: handle.repository_name.clone(),
                    removal_policy: self.removal_policy,
                },
            )?;
        }
        for handle in &handles {
            template.add(
                format!("{}RepositoryName", handle.role.registry_prefix()),
                ResourceSpec::Parameter {
                    name: handle.lookup_key.clone(),
                    value: Value::attr(&handle.logical_id, Attribute::Name),
                    description: parameter_description(handle.role).to_string(),
                    tier: ParameterTier::Standard,
                },
            )?;
        }
        for handle in &handles {
            template.output(
                handle.uri_output.clone(),
                Value::attr(&handle.logical_id, Attribute::Uri),
                uri_description(handle.role),
            )?;
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesize(provisioner: &RegistryProvisioner) -> UnitTemplate {
        provisioner
            .synthesize(&UnitInputs::new(provisioner.name().clone()))
            .unwrap()
    }

    #[test]
    fn test_repositories_and_parameters() {
        let provisioner = RegistryProvisioner::new(DeploymentName::new("demo").unwrap());
        let template = synthesize(&provisioner);
        assert_eq!(template.unit().as_str(), "demo-docker");

        let names: Vec<(&str, Option<&str>)> = template
            .resources()
            .iter()
            .map(|r| (r.id.as_str(), r.spec.physical_name()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("appRepository", Some("demo-app")),
                ("worldRepository", Some("demo-world-app")),
                ("appRepositoryName", Some("/demo/appRepositoryName")),
                ("worldRepositoryName", Some("/demo/worldRepositoryName")),
            ]
        );
        let outputs: Vec<&str> = template.outputs().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(outputs, vec!["appRepositoryURI", "worldRepositoryURI"]);
    }

    #[test]
    fn test_parameters_publish_repository_names() {
        let provisioner = RegistryProvisioner::new(DeploymentName::new("demo").unwrap());
        let template = synthesize(&provisioner);
        let parameter = template.get(&LogicalId::new("worldRepositoryName")).unwrap();
        match &parameter.spec {
            ResourceSpec::Parameter { value, tier, .. } => {
                assert_eq!(
                    value,
                    &Value::attr(&LogicalId::new("worldRepository"), Attribute::Name)
                );
                assert_eq!(*tier, ParameterTier::Standard);
            }
            other => panic!("expected parameter, got {other:?}"),
        }
    }

    #[test]
    fn test_removal_policy_defaults_to_destroy() {
        let deployment = DeploymentName::new("demo").unwrap();
        let destroy = synthesize(&RegistryProvisioner::new(deployment.clone()));
        let retain = synthesize(
            &RegistryProvisioner::new(deployment).with_removal_policy(RemovalPolicy::Retain),
        );
        let policy = |t: &UnitTemplate| t.resources()[0].spec.removal_policy();
        assert_eq!(policy(&destroy), RemovalPolicy::Destroy);
        assert_eq!(policy(&retain), RemovalPolicy::Retain);
    }
}
