//! Identities and the shared access boundary of the topology unit.

use crate::error::DeployError;
use crate::model::{
    IngressRule, LogicalId, OutboundPolicy, Peer, PolicyStatement, Protocol, Pseudo,
    ResourceSpec, UnitTemplate, Value,
};

/// Port every service container listens on.
pub const SERVICE_PORT: u16 = 8080;

/// Port every front door listens on.
pub const FRONT_DOOR_PORT: u16 = 80;

const TASK_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";

/// The one security boundary shared by every service and front door of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBoundary {
    pub description: String,
    pub ingress: Vec<IngressRule>,
    pub outbound: OutboundPolicy,
}

impl AccessBoundary {
    /// Service port and front-door port open to any IPv4 source, outbound unrestricted.
    pub fn shared() -> Self {
        Self {
            description: "Security group for hello app".to_string(),
            ingress: vec![
                IngressRule {
                    protocol: Protocol::Tcp,
                    port: SERVICE_PORT,
                    source: Peer::AnyIpv4,
                    description: "Allow hello app traffic".to_string(),
                },
                IngressRule {
                    protocol: Protocol::Tcp,
                    port: FRONT_DOOR_PORT,
                    source: Peer::AnyIpv4,
                    description: "Allow ALB traffic".to_string(),
                },
            ],
            outbound: OutboundPolicy::AllowAll,
        }
    }

    /// Whether inbound `protocol`/`port` traffic from `cidr` is admitted.
    pub fn allows(&self, protocol: Protocol, port: u16, cidr: &str) -> bool {
        self.ingress.iter().any(|rule| {
            rule.protocol == protocol
                && rule.port == port
                && (rule.source == Peer::AnyIpv4 || rule.source.cidr() == cidr)
        })
    }

    pub fn declare(&self, template: &mut UnitTemplate, network: Value) -> Result<LogicalId, DeployError> {
        template.add(
            "ServiceSecurityGroup",
            ResourceSpec::SecurityGroup {
                network,
                description: self.description.clone(),
                ingress: self.ingress.clone(),
                outbound: self.outbound,
            },
        )
    }
}

/// Execution identity (pulls images, reads agent configuration) and runtime identity
/// (emits telemetry), shared by both services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identities {
    pub execution: LogicalId,
    pub task: LogicalId,
}

impl Identities {
    pub fn declare(template: &mut UnitTemplate) -> Result<Self, DeployError> {
        let agent_configuration = Value::join([
            Value::literal("arn:aws:ssm:"),
            Value::Pseudo(Pseudo::Region),
            Value::literal(":"),
            Value::Pseudo(Pseudo::AccountId),
            Value::literal(":parameter/ecs-cwagent"),
        ]);
        let execution = template.add(
            "TaskExecutionRole",
            ResourceSpec::Role {
                assumed_by: TASK_PRINCIPAL.to_string(),
                managed_policies: vec!["service-role/AmazonECSTaskExecutionRolePolicy".to_string()],
                statements: vec![PolicyStatement {
                    actions: vec!["ssm:GetParameters".to_string(), "ssm:GetParameter".to_string()],
                    resources: vec![agent_configuration],
                }],
            },
        )?;
        let task = template.add(
            "TaskRole",
            ResourceSpec::Role {
                assumed_by: TASK_PRINCIPAL.to_string(),
                managed_policies: vec!["CloudWatchAgentServerPolicy".to_string()],
                statements: Vec::new(),
            },
        )?;
        Ok(Self { execution, task })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitName;

    #[test]
    fn test_shared_boundary_rules() {
        let boundary = AccessBoundary::shared();
        assert!(boundary.allows(Protocol::Tcp, 8080, "203.0.113.7/32"));
        assert!(boundary.allows(Protocol::Tcp, 80, "0.0.0.0/0"));
        assert!(!boundary.allows(Protocol::Tcp, 22, "0.0.0.0/0"));
        assert!(!boundary.allows(Protocol::Http, 80, "0.0.0.0/0"));
        assert_eq!(boundary.outbound, OutboundPolicy::AllowAll);
    }

    #[test]
    fn test_execution_role_reads_agent_configuration_only() {
        let mut template = UnitTemplate::new(UnitName::new("demo-app"));
        let identities = Identities::declare(&mut template).unwrap();
        let execution = template.get(&identities.execution).unwrap();
        let ResourceSpec::Role { statements, managed_policies, .. } = &execution.spec else {
            panic!("expected role");
        };
        assert_eq!(managed_policies, &vec!["service-role/AmazonECSTaskExecutionRolePolicy".to_string()]);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].actions, vec!["ssm:GetParameters", "ssm:GetParameter"]);

        let task = template.get(&identities.task).unwrap();
        let ResourceSpec::Role { statements, .. } = &task.spec else {
            panic!("expected role");
        };
        assert!(statements.is_empty());
    }
}
