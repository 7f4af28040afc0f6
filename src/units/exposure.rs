//! Internet-facing front doors and the wiring from a front door to one service.

use crate::error::DeployError;
use crate::model::{
    Attribute, HealthCheck, LogicalId, Protocol, ResourceSpec, ServiceRole, TargetType,
    UnitTemplate, Value,
};
use crate::units::access::{FRONT_DOOR_PORT, SERVICE_PORT};
use crate::units::service::DeclaredService;

/// How one service is exposed behind its front door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureEndpoint {
    pub role: ServiceRole,
    pub listener_port: u16,
    pub target_port: u16,
    pub health_check: HealthCheck,
}

/// Where an endpoint lands in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredEndpoint {
    pub front_door: LogicalId,
    pub target_group: LogicalId,
    pub listener: LogicalId,
    pub attachment: LogicalId,
}

impl DeclaredEndpoint {
    /// The front door's public DNS name, once assigned.
    pub fn address(&self) -> Value {
        Value::attr(&self.front_door, Attribute::DnsName)
    }

    pub fn base_url(&self) -> Value {
        Value::join([Value::literal("http://"), self.address()])
    }
}

impl ExposureEndpoint {
    /// Port 80 forwarding to 8080, healthy when `/` answers `200`.
    pub fn for_role(role: ServiceRole) -> Self {
        Self {
            role,
            listener_port: FRONT_DOOR_PORT,
            target_port: SERVICE_PORT,
            health_check: HealthCheck::http("/", "200"),
        }
    }

    fn id(&self, suffix: &str) -> LogicalId {
        LogicalId::new(format!("{}{suffix}", self.role.logical_prefix()))
    }

    /// Declares the internet-facing load balancer for `role`.
    pub fn declare_front_door(
        template: &mut UnitTemplate,
        role: ServiceRole,
        network: &Value,
        security_group: &LogicalId,
    ) -> Result<LogicalId, DeployError> {
        template.add(
            format!("{}ALB", role.logical_prefix()),
            ResourceSpec::LoadBalancer {
                network: network.clone(),
                internet_facing: true,
                security_group: Value::attr(security_group, Attribute::Id),
            },
        )
    }

    /// Target group, listener and target registration. `service` must already be declared,
    /// so membership is only established once the service exists.
    pub fn declare(
        &self,
        template: &mut UnitTemplate,
        front_door: &LogicalId,
        network: &Value,
        service: &DeclaredService,
    ) -> Result<DeclaredEndpoint, DeployError> {
        if service.role != self.role {
            return Err(DeployError::configuration(
                format!("{} endpoint", self.role.app_name()),
                format!("cannot expose the {} service", service.role.app_name()),
            ));
        }
        let target_group = template.add(
            self.id("TargetGroup"),
            ResourceSpec::TargetGroup {
                network: network.clone(),
                port: self.target_port,
                protocol: Protocol::Http,
                target_type: TargetType::Ip,
                health_check: self.health_check.clone(),
            },
        )?;
        let attachment = template.add(
            self.id("TargetAttachment"),
            ResourceSpec::TargetAttachment {
                target_group: Value::attr(&target_group, Attribute::Arn),
                service: Value::attr(&service.service, Attribute::Arn),
                container_name: service.container.clone(),
                container_port: self.target_port,
            },
        )?;
        let listener = template.add(
            self.id("Listener"),
            ResourceSpec::Listener {
                load_balancer: Value::attr(front_door, Attribute::Arn),
                port: self.listener_port,
                target_group: Value::attr(&target_group, Attribute::Arn),
            },
        )?;
        Ok(DeclaredEndpoint {
            front_door: front_door.clone(),
            target_group,
            listener,
            attachment,
        })
    }
}
