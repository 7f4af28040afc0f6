//! One deployable service: log sink, task definition and the running service itself.

use crate::error::DeployError;
use crate::model::{
    Attribute, ContainerDefinition, LogConfiguration, LogicalId, Pseudo, ResourceSpec, ServiceRole,
    UnitTemplate, Value,
};
use crate::units::access::{Identities, SERVICE_PORT};
use crate::units::telemetry::TelemetryIntegration;
use std::collections::BTreeMap;

const IMAGE_TAG: &str = "latest";
const LOG_RETENTION_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub role: ServiceRole,
    pub image: Value,
    pub port: u16,
    pub environment: BTreeMap<String, Value>,
    pub desired_count: u32,
    /// 0 lets an update take the service fully offline.
    pub min_healthy_percent: u32,
    pub cpu: u32,
    pub memory_mib: u32,
    pub log_retention_days: u32,
    pub telemetry: Option<TelemetryIntegration>,
}

/// Where a service lands in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredService {
    pub role: ServiceRole,
    pub service: LogicalId,
    pub task_definition: LogicalId,
    pub container: String,
}

/// What every service of the topology attaches to.
#[derive(Debug, Clone, Copy)]
pub struct ServicePlacement<'a> {
    pub cluster: &'a Value,
    pub identities: &'a Identities,
    pub security_group: &'a LogicalId,
}

impl ServiceDescriptor {
    /// A service running `repository_name:latest` from the deployment's own registry.
    pub fn new(role: ServiceRole, repository_name: &str) -> Self {
        let image = Value::join([
            Value::Pseudo(Pseudo::AccountId),
            Value::literal(".dkr.ecr."),
            Value::Pseudo(Pseudo::Region),
            Value::literal(format!(".amazonaws.com/{repository_name}:{IMAGE_TAG}")),
        ]);
        let environment = BTreeMap::from([
            ("SERVER_PORT".to_string(), Value::literal(SERVICE_PORT.to_string())),
            ("SPRING_APPLICATION_NAME".to_string(), Value::literal(role.app_name())),
        ]);
        Self {
            role,
            image,
            port: SERVICE_PORT,
            environment,
            desired_count: 1,
            min_healthy_percent: 0,
            cpu: 256,
            memory_mib: 512,
            log_retention_days: LOG_RETENTION_DAYS,
            telemetry: None,
        }
    }

    pub fn with_env(mut self, name: impl Into<String>, value: Value) -> Self {
        self.environment.insert(name.into(), value);
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryIntegration) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    fn id(&self, suffix: &str) -> LogicalId {
        LogicalId::new(format!("{}{suffix}", self.role.logical_prefix()))
    }

    /// Declares the service. The running service additionally waits for `depends_on`.
    pub fn declare(
        &self,
        template: &mut UnitTemplate,
        placement: ServicePlacement<'_>,
        depends_on: Vec<LogicalId>,
    ) -> Result<DeclaredService, DeployError> {
        let log_group = template.add(
            self.id("LogGroup"),
            ResourceSpec::LogGroup {
                retention_days: self.log_retention_days,
            },
        )?;
        let log_group = Value::attr(&log_group, Attribute::Name);

        let container_name = format!("{}Container", self.role.logical_prefix());
        let mut container = ContainerDefinition::new(container_name.clone(), self.image.clone());
        container.port_mappings.push(self.port);
        container.environment = self.environment.clone();
        container.logging = Some(LogConfiguration {
            log_group: log_group.clone(),
            stream_prefix: format!("{}-app", self.role.app_name()),
        });

        let mut containers = vec![container];
        let mut volumes = Vec::new();
        if let Some(telemetry) = &self.telemetry {
            telemetry.apply(&mut containers, &mut volumes, &container_name, &log_group)?;
        }

        let task_definition = template.add(
            self.id("TaskDef"),
            ResourceSpec::TaskDefinition {
                cpu: self.cpu,
                memory_mib: self.memory_mib,
                execution_role: Value::attr(&placement.identities.execution, Attribute::Arn),
                task_role: Value::attr(&placement.identities.task, Attribute::Arn),
                containers,
                volumes,
            },
        )?;

        let service = template.add_with_deps(
            self.id("Service"),
            ResourceSpec::Service {
                cluster: placement.cluster.clone(),
                task_definition: Value::attr(&task_definition, Attribute::Arn),
                desired_count: self.desired_count,
                min_healthy_percent: self.min_healthy_percent,
                assign_public_ip: true,
                security_groups: vec![Value::attr(placement.security_group, Attribute::Id)],
            },
            depends_on,
        )?;

        Ok(DeclaredService {
            role: self.role,
            service,
            task_definition,
            container: container_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitName;
    use crate::units::AccessBoundary;

    fn declare(descriptor: &ServiceDescriptor) -> (UnitTemplate, DeclaredService) {
        let mut template = UnitTemplate::new(UnitName::new("demo-app"));
        let identities = Identities::declare(&mut template).unwrap();
        let security_group = AccessBoundary::shared()
            .declare(&mut template, Value::literal("vpc-1"))
            .unwrap();
        let cluster = Value::literal("demo-cluster");
        let declared = descriptor
            .declare(
                &mut template,
                ServicePlacement {
                    cluster: &cluster,
                    identities: &identities,
                    security_group: &security_group,
                },
                Vec::new(),
            )
            .unwrap();
        (template, declared)
    }

    #[test]
    fn test_service_defaults() {
        let (template, declared) = declare(&ServiceDescriptor::new(ServiceRole::Primary, "demo-app"));
        assert_eq!(declared.service.as_str(), "HelloService");
        assert_eq!(declared.task_definition.as_str(), "HelloTaskDef");
        assert_eq!(declared.container, "HelloContainer");

        let ResourceSpec::Service {
            desired_count,
            min_healthy_percent,
            assign_public_ip,
            ..
        } = &template.get(&declared.service).unwrap().spec
        else {
            panic!("expected service");
        };
        assert_eq!((*desired_count, *min_healthy_percent, *assign_public_ip), (1, 0, true));
    }

    #[test]
    fn test_container_wiring() {
        let descriptor = ServiceDescriptor::new(ServiceRole::Dependency, "demo-world-app");
        let (template, declared) = declare(&descriptor);
        let ResourceSpec::TaskDefinition { cpu, memory_mib, containers, .. } =
            &template.get(&declared.task_definition).unwrap().spec
        else {
            panic!("expected task definition");
        };
        assert_eq!((*cpu, *memory_mib), (256, 512));
        assert_eq!(containers.len(), 1);
        let container = &containers[0];
        assert_eq!(container.port_mappings, vec![8080]);
        assert_eq!(container.env("SERVER_PORT"), Some(&Value::literal("8080")));
        assert_eq!(container.env("SPRING_APPLICATION_NAME"), Some(&Value::literal("world")));
        assert_eq!(container.logging.as_ref().unwrap().stream_prefix, "world-app");
        assert_eq!(
            container.image.references().len(),
            0,
            "images come from the registry by name"
        );
    }

    #[test]
    fn test_telemetry_adds_containers() {
        let descriptor = ServiceDescriptor::new(ServiceRole::Dependency, "demo-world-app")
            .with_telemetry(TelemetryIntegration::java("world-service"));
        let (template, declared) = declare(&descriptor);
        let ResourceSpec::TaskDefinition { containers, volumes, .. } =
            &template.get(&declared.task_definition).unwrap().spec
        else {
            panic!("expected task definition");
        };
        assert_eq!(containers.len(), 3);
        assert_eq!(volumes.len(), 1);
    }
}
