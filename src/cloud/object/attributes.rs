//! Attributes a cloud object exposes, derived from its kind, owner and sequence.

use super::ObjectId;
use crate::cloud::{LOCAL_ACCOUNT_ID, LOCAL_REGION};
use crate::model::{Attribute, LogicalId, ResourceSpec, UnitName};
use std::collections::BTreeMap;

const MAX_SHORT_NAME_LEN: usize = 24;

/// Lowercase `{unit}-{logical}` trimmed to what load balancer names allow.
fn short_name(unit: &UnitName, logical_id: &LogicalId) -> String {
    let raw = format!("{unit}-{logical_id}").to_ascii_lowercase();
    let mut name: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(MAX_SHORT_NAME_LEN)
        .collect();
    while name.ends_with('-') {
        name.pop();
    }
    name
}

fn arn(service: &str, resource: &str) -> String {
    format!("arn:aws:{service}:{LOCAL_REGION}:{LOCAL_ACCOUNT_ID}:{resource}")
}

pub fn compute(
    id: ObjectId,
    unit: &UnitName,
    logical_id: &LogicalId,
    spec: &ResourceSpec,
    revision: u32,
) -> BTreeMap<Attribute, String> {
    let seq = id.0;
    let short = short_name(unit, logical_id);
    let mut attributes = BTreeMap::new();

    let (physical_id, name, resource_arn) = match spec {
        ResourceSpec::Network { .. } => {
            let vpc = format!("vpc-{seq:08x}");
            (vpc.clone(), vpc.clone(), arn("ec2", &format!("vpc/{vpc}")))
        }
        ResourceSpec::Cluster { cluster_name, .. } => (
            cluster_name.clone(),
            cluster_name.clone(),
            arn("ecs", &format!("cluster/{cluster_name}")),
        ),
        ResourceSpec::Role { .. } => {
            let role = format!("{short}-{seq:06x}");
            (
                role.clone(),
                role.clone(),
                format!("arn:aws:iam::{LOCAL_ACCOUNT_ID}:role/{role}"),
            )
        }
        ResourceSpec::SecurityGroup { .. } => {
            let sg = format!("sg-{seq:08x}");
            (sg.clone(), sg.clone(), arn("ec2", &format!("security-group/{sg}")))
        }
        ResourceSpec::LoadBalancer { .. } => {
            let lb_arn = arn(
                "elasticloadbalancing",
                &format!("loadbalancer/app/{short}/{seq:016x}"),
            );
            attributes.insert(
                Attribute::DnsName,
                format!("{short}-{}.{LOCAL_REGION}.elb.amazonaws.com", 1_000_000 + seq),
            );
            (lb_arn.clone(), short.clone(), lb_arn)
        }
        ResourceSpec::TargetGroup { .. } => {
            let tg_arn = arn(
                "elasticloadbalancing",
                &format!("targetgroup/{short}/{seq:016x}"),
            );
            (tg_arn.clone(), short.clone(), tg_arn)
        }
        ResourceSpec::Listener { .. } => {
            let listener_arn = arn(
                "elasticloadbalancing",
                &format!("listener/app/{short}/{seq:016x}"),
            );
            (listener_arn.clone(), short.clone(), listener_arn)
        }
        ResourceSpec::LogGroup { .. } => {
            let group = format!("{short}-{seq:06x}");
            (group.clone(), group.clone(), arn("logs", &format!("log-group:{group}")))
        }
        ResourceSpec::TaskDefinition { .. } => {
            let family = short.replace('-', "");
            let td_arn = arn("ecs", &format!("task-definition/{family}:{revision}"));
            (td_arn.clone(), family, td_arn)
        }
        ResourceSpec::Service { .. } => {
            let service = format!("{short}-{seq:06x}");
            (
                service.clone(),
                service.clone(),
                arn("ecs", &format!("service/{service}")),
            )
        }
        ResourceSpec::TargetAttachment { .. } => {
            let attachment = format!("{short}-{seq:06x}");
            (attachment.clone(), attachment.clone(), attachment)
        }
        ResourceSpec::ImageRepository { .. } | ResourceSpec::Parameter { .. } => {
            let name = format!("{short}-{seq:06x}");
            (name.clone(), name.clone(), name)
        }
    };

    attributes.insert(Attribute::Id, physical_id);
    attributes.insert(Attribute::Name, name);
    attributes.insert(Attribute::Arn, resource_arn);
    attributes
}
