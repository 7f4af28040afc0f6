//! The resource catalogue a unit template can declare.
//!
//! Only the kinds this deployment shape needs are modelled. Fields that may point at another
//! resource are [`Value`]s; everything else is plain data fixed at synthesis time.

use crate::model::naming::{LogicalId, ParameterKey};
use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// What happens to a resource when its owning unit is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Left in place, outside any unit.
    #[default]
    Retain,
    /// Deleted together with its contents.
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterTier {
    #[default]
    Standard,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Ip,
    Instance,
}

/// Source of inbound traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Peer {
    AnyIpv4,
    Cidr(String),
}

impl Peer {
    pub fn cidr(&self) -> &str {
        match self {
            Peer::AnyIpv4 => "0.0.0.0/0",
            Peer::Cidr(cidr) => cidr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub port: u16,
    pub source: Peer,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundPolicy {
    AllowAll,
    DenyAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub path: String,
    /// Comma separated codes or ranges, e.g. `200` or `200-299,302`.
    pub healthy_http_codes: String,
}

impl HealthCheck {
    pub fn http(path: impl Into<String>, healthy_http_codes: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            healthy_http_codes: healthy_http_codes.into(),
        }
    }

    /// Whether a probe that answered `status` counts as healthy.
    pub fn accepts(&self, status: u16) -> bool {
        self.healthy_http_codes.split(',').any(|code| {
            let code = code.trim();
            match code.split_once('-') {
                Some((low, high)) => match (low.parse::<u16>(), high.parse::<u16>()) {
                    (Ok(low), Ok(high)) => (low..=high).contains(&status),
                    _ => false,
                },
                None => code.parse::<u16>() == Ok(status),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfiguration {
    pub log_group: Value,
    pub stream_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    pub volume: String,
    pub container_path: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerCondition {
    Start,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDependency {
    pub container: String,
    pub condition: ContainerCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: Value,
    pub essential: bool,
    pub cpu: Option<u32>,
    pub memory_mib: Option<u32>,
    pub port_mappings: Vec<u16>,
    pub environment: BTreeMap<String, Value>,
    pub command: Vec<String>,
    pub logging: Option<LogConfiguration>,
    pub mounts: Vec<MountPoint>,
    pub depends_on: Vec<ContainerDependency>,
}

impl ContainerDefinition {
    pub fn new(name: impl Into<String>, image: Value) -> Self {
        Self {
            name: name.into(),
            image,
            essential: true,
            cpu: None,
            memory_mib: None,
            port_mappings: Vec::new(),
            environment: BTreeMap::new(),
            command: Vec::new(),
            logging: None,
            mounts: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn env(&self, name: &str) -> Option<&Value> {
        self.environment.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceSpec {
    ImageRepository {
        repository_name: String,
        removal_policy: RemovalPolicy,
    },
    Parameter {
        name: ParameterKey,
        value: Value,
        description: String,
        tier: ParameterTier,
    },
    Network {
        cidr: String,
        max_azs: u8,
        nat_gateways: u8,
    },
    Cluster {
        cluster_name: String,
        network: Value,
    },
    Role {
        assumed_by: String,
        managed_policies: Vec<String>,
        statements: Vec<PolicyStatement>,
    },
    SecurityGroup {
        network: Value,
        description: String,
        ingress: Vec<IngressRule>,
        outbound: OutboundPolicy,
    },
    LoadBalancer {
        network: Value,
        internet_facing: bool,
        security_group: Value,
    },
    TargetGroup {
        network: Value,
        port: u16,
        protocol: Protocol,
        target_type: TargetType,
        health_check: HealthCheck,
    },
    Listener {
        load_balancer: Value,
        port: u16,
        target_group: Value,
    },
    LogGroup {
        retention_days: u32,
    },
    TaskDefinition {
        cpu: u32,
        memory_mib: u32,
        execution_role: Value,
        task_role: Value,
        containers: Vec<ContainerDefinition>,
        volumes: Vec<String>,
    },
    Service {
        cluster: Value,
        task_definition: Value,
        desired_count: u32,
        min_healthy_percent: u32,
        assign_public_ip: bool,
        security_groups: Vec<Value>,
    },
    /// Registers a service's tasks as targets of a target group.
    TargetAttachment {
        target_group: Value,
        service: Value,
        container_name: String,
        container_port: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    ImageRepository,
    Parameter,
    Network,
    Cluster,
    Role,
    SecurityGroup,
    LoadBalancer,
    TargetGroup,
    Listener,
    LogGroup,
    TaskDefinition,
    Service,
    TargetAttachment,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::ImageRepository { .. } => ResourceKind::ImageRepository,
            ResourceSpec::Parameter { .. } => ResourceKind::Parameter,
            ResourceSpec::Network { .. } => ResourceKind::Network,
            ResourceSpec::Cluster { .. } => ResourceKind::Cluster,
            ResourceSpec::Role { .. } => ResourceKind::Role,
            ResourceSpec::SecurityGroup { .. } => ResourceKind::SecurityGroup,
            ResourceSpec::LoadBalancer { .. } => ResourceKind::LoadBalancer,
            ResourceSpec::TargetGroup { .. } => ResourceKind::TargetGroup,
            ResourceSpec::Listener { .. } => ResourceKind::Listener,
            ResourceSpec::LogGroup { .. } => ResourceKind::LogGroup,
            ResourceSpec::TaskDefinition { .. } => ResourceKind::TaskDefinition,
            ResourceSpec::Service { .. } => ResourceKind::Service,
            ResourceSpec::TargetAttachment { .. } => ResourceKind::TargetAttachment,
        }
    }

    /// The externally visible name, for kinds whose name is chosen by the template.
    /// Changing it forces a replacement instead of an in-place update.
    pub fn physical_name(&self) -> Option<&str> {
        match self {
            ResourceSpec::ImageRepository {
                repository_name, ..
            } => Some(repository_name),
            ResourceSpec::Parameter { name, .. } => Some(name.as_str()),
            ResourceSpec::Cluster { cluster_name, .. } => Some(cluster_name),
            _ => None,
        }
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        match self {
            ResourceSpec::ImageRepository { removal_policy, .. } => *removal_policy,
            _ => RemovalPolicy::Destroy,
        }
    }

    /// Every [`Value`] in the spec, in field order.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            ResourceSpec::ImageRepository { .. }
            | ResourceSpec::Network { .. }
            | ResourceSpec::LogGroup { .. } => Vec::new(),
            ResourceSpec::Parameter { value, .. } => vec![value],
            ResourceSpec::Cluster { network, .. }
            | ResourceSpec::SecurityGroup { network, .. }
            | ResourceSpec::TargetGroup { network, .. } => vec![network],
            ResourceSpec::Role { statements, .. } => statements
                .iter()
                .flat_map(|statement| statement.resources.iter())
                .collect(),
            ResourceSpec::LoadBalancer {
                network,
                security_group,
                ..
            } => vec![network, security_group],
            ResourceSpec::Listener {
                load_balancer,
                target_group,
                ..
            } => vec![load_balancer, target_group],
            ResourceSpec::TaskDefinition {
                execution_role,
                task_role,
                containers,
                ..
            } => {
                let mut values = vec![execution_role, task_role];
                for container in containers {
                    values.push(&container.image);
                    values.extend(container.environment.values());
                    if let Some(logging) = &container.logging {
                        values.push(&logging.log_group);
                    }
                }
                values
            }
            ResourceSpec::Service {
                cluster,
                task_definition,
                security_groups,
                ..
            } => {
                let mut values = vec![cluster, task_definition];
                values.extend(security_groups.iter());
                values
            }
            ResourceSpec::TargetAttachment {
                target_group,
                service,
                ..
            } => vec![target_group, service],
        }
    }

    /// Mutable counterpart of [`ResourceSpec::values`], same order.
    pub fn values_mut(&mut self) -> Vec<&mut Value> {
        match self {
            ResourceSpec::ImageRepository { .. }
            | ResourceSpec::Network { .. }
            | ResourceSpec::LogGroup { .. } => Vec::new(),
            ResourceSpec::Parameter { value, .. } => vec![value],
            ResourceSpec::Cluster { network, .. }
            | ResourceSpec::SecurityGroup { network, .. }
            | ResourceSpec::TargetGroup { network, .. } => vec![network],
            ResourceSpec::Role { statements, .. } => statements
                .iter_mut()
                .flat_map(|statement| statement.resources.iter_mut())
                .collect(),
            ResourceSpec::LoadBalancer {
                network,
                security_group,
                ..
            } => vec![network, security_group],
            ResourceSpec::Listener {
                load_balancer,
                target_group,
                ..
            } => vec![load_balancer, target_group],
            ResourceSpec::TaskDefinition {
                execution_role,
                task_role,
                containers,
                ..
            } => {
                let mut values = vec![execution_role, task_role];
                for container in containers {
                    values.push(&mut container.image);
                    values.extend(container.environment.values_mut());
                    if let Some(logging) = &mut container.logging {
                        values.push(&mut logging.log_group);
                    }
                }
                values
            }
            ResourceSpec::Service {
                cluster,
                task_definition,
                security_groups,
                ..
            } => {
                let mut values = vec![cluster, task_definition];
                values.extend(security_groups.iter_mut());
                values
            }
            ResourceSpec::TargetAttachment {
                target_group,
                service,
                ..
            } => vec![target_group, service],
        }
    }

    /// Resources referenced by any value, deduplicated, first appearance first.
    pub fn references(&self) -> Vec<&LogicalId> {
        let mut found: Vec<&LogicalId> = Vec::new();
        for reference in self.values().into_iter().flat_map(Value::references) {
            if !found.contains(&reference) {
                found.push(reference);
            }
        }
        found
    }
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: LogicalId,
    pub spec: ResourceSpec,
    /// Ordering constraints beyond what the values reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<LogicalId>,
}

impl Resource {
    /// Explicit dependencies first, then referenced resources, without duplicates.
    pub fn dependencies(&self) -> Vec<&LogicalId> {
        let mut found: Vec<&LogicalId> = self.depends_on.iter().collect();
        for reference in self.spec.references() {
            if !found.contains(&reference) {
                found.push(reference);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::Attribute;

    #[test]
    fn test_health_check_accepts_exact_code_only() {
        let check = HealthCheck::http("/", "200");
        assert!(check.accepts(200));
        assert!(!check.accepts(204));
        assert!(!check.accepts(500));
    }

    #[test]
    fn test_health_check_ranges_and_lists() {
        let check = HealthCheck::http("/", "200-299, 302");
        assert!(check.accepts(204));
        assert!(check.accepts(302));
        assert!(!check.accepts(301));
    }

    #[test]
    fn test_references_are_deduplicated() {
        let lb = LogicalId::new("WorldALB");
        let tg = LogicalId::new("WorldTargetGroup");
        let listener = ResourceSpec::Listener {
            load_balancer: Value::attr(&lb, Attribute::Arn),
            port: 80,
            target_group: Value::attr(&tg, Attribute::Arn),
        };
        assert_eq!(listener.references(), vec![&lb, &tg]);

        let resource = Resource {
            id: LogicalId::new("WorldListener"),
            spec: listener,
            depends_on: vec![tg.clone()],
        };
        assert_eq!(resource.dependencies(), vec![&tg, &lb]);
    }

    #[test]
    fn test_container_values_include_environment() {
        let alb = LogicalId::new("WorldALB");
        let mut container = ContainerDefinition::new("HelloContainer", Value::literal("demo-app"));
        container.environment.insert(
            "WORLD_SERVICE_URL".to_string(),
            Value::join([Value::literal("http://"), Value::attr(&alb, Attribute::DnsName)]),
        );
        let mut spec = ResourceSpec::TaskDefinition {
            cpu: 256,
            memory_mib: 512,
            execution_role: Value::literal("exec"),
            task_role: Value::literal("task"),
            containers: vec![container],
            volumes: Vec::new(),
        };
        assert_eq!(spec.references(), vec![&alb]);

        for value in spec.values_mut() {
            *value = Value::literal("resolved");
        }
        assert!(spec.references().is_empty());
    }
}
