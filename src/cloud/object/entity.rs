//! Entity trait implementation for [`CloudObject`].
//!
//! Creation validates the resolved spec: every value must already be a literal, task sizes must
//! be a supported CPU/memory pair, and images served by the local registry must come from a
//! repository that exists. The last check goes through the [`RepositoryClient`] context.

use super::actions::{CloudObjectAction, CloudObjectActionResult};
use super::attributes;
use super::{
    CloudObject, CloudObjectCreate, CloudObjectError, CloudObjectUpdate, ObjectId,
    DEFAULT_HEALTH_RESPONSE,
};
use crate::clients::RepositoryClient;
use crate::cloud::registry_host;
use crate::framework::{ActorClient, ActorEntity};
use crate::model::{ResourceKind, ResourceSpec};
use async_trait::async_trait;
use tracing::debug;

/// Fargate CPU units and the memory sizes (MiB) allowed with them.
fn memory_allowed(cpu: u32, memory_mib: u32) -> bool {
    match cpu {
        256 => matches!(memory_mib, 512 | 1024 | 2048),
        512 => (1024..=4096).contains(&memory_mib) && memory_mib % 1024 == 0,
        1024 => (2048..=8192).contains(&memory_mib) && memory_mib % 1024 == 0,
        2048 => (4096..=16384).contains(&memory_mib) && memory_mib % 1024 == 0,
        4096 => (8192..=30720).contains(&memory_mib) && memory_mib % 1024 == 0,
        _ => false,
    }
}

impl CloudObject {
    fn invalid(&self, reason: impl Into<String>) -> CloudObjectError {
        CloudObjectError::InvalidSpec {
            kind: self.kind().to_string(),
            logical_id: self.logical_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Checks that only depend on the spec itself.
    fn validate(&self) -> Result<(), CloudObjectError> {
        if self.spec.values().iter().any(|value| value.as_literal().is_none()) {
            return Err(self.invalid("spec still contains unresolved references"));
        }
        match &self.spec {
            ResourceSpec::ImageRepository { .. } | ResourceSpec::Parameter { .. } => {
                Err(self.invalid("served by a dedicated service"))
            }
            ResourceSpec::TargetGroup { port, health_check, .. } => {
                if *port == 0 {
                    return Err(self.invalid("port must not be 0"));
                }
                if !health_check.path.starts_with('/') {
                    return Err(self.invalid("health check path must start with '/'"));
                }
                if !(100..=599).any(|status| health_check.accepts(status)) {
                    return Err(self.invalid("health check accepts no HTTP status"));
                }
                Ok(())
            }
            ResourceSpec::Listener { port: 0, .. } => Err(self.invalid("port must not be 0")),
            ResourceSpec::TaskDefinition {
                cpu,
                memory_mib,
                containers,
                volumes,
                ..
            } => {
                if !memory_allowed(*cpu, *memory_mib) {
                    return Err(self.invalid(format!(
                        "{memory_mib} MiB is not a supported size for {cpu} CPU units"
                    )));
                }
                if containers.is_empty() || !containers.iter().any(|c| c.essential) {
                    return Err(self.invalid("needs at least one essential container"));
                }
                let reserved_cpu: u32 = containers.iter().filter_map(|c| c.cpu).sum();
                let reserved_memory: u32 = containers.iter().filter_map(|c| c.memory_mib).sum();
                if reserved_cpu > *cpu || reserved_memory > *memory_mib {
                    return Err(self.invalid("container reservations exceed the task size"));
                }
                for container in containers {
                    if let Some(mount) = container.mounts.iter().find(|m| !volumes.contains(&m.volume)) {
                        return Err(self.invalid(format!(
                            "container `{}` mounts unknown volume `{}`",
                            container.name, mount.volume
                        )));
                    }
                    if let Some(dep) = container
                        .depends_on
                        .iter()
                        .find(|dep| !containers.iter().any(|c| c.name == dep.container))
                    {
                        return Err(self.invalid(format!(
                            "container `{}` depends on unknown container `{}`",
                            container.name, dep.container
                        )));
                    }
                }
                Ok(())
            }
            ResourceSpec::Service {
                desired_count,
                min_healthy_percent,
                security_groups,
                ..
            } => {
                if *min_healthy_percent > 100 {
                    return Err(self.invalid("minimum healthy percent must be at most 100"));
                }
                if *desired_count > 0 && security_groups.is_empty() {
                    return Err(self.invalid("a running service needs a security group"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Images hosted by the local registry must point at an existing repository.
    async fn check_images(&self, repositories: &RepositoryClient) -> Result<(), CloudObjectError> {
        let ResourceSpec::TaskDefinition { containers, .. } = &self.spec else {
            return Ok(());
        };
        let prefix = format!("{}/", registry_host());
        for image in containers.iter().filter_map(|c| c.image.as_literal()) {
            let Some(reference) = image.strip_prefix(&prefix) else {
                continue;
            };
            let repository = reference
                .rsplit_once(':')
                .map_or(reference, |(name, _tag)| name);
            if repositories.get(repository.to_string()).await?.is_none() {
                return Err(CloudObjectError::ImageRepositoryNotFound(repository.to_string()));
            }
            debug!(logical_id = %self.logical_id, repository, "Image repository found");
        }
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for CloudObject {
    type Id = ObjectId;
    type Create = CloudObjectCreate;
    type Update = CloudObjectUpdate;
    type Action = CloudObjectAction;
    type ActionResult = CloudObjectActionResult;
    type Context = RepositoryClient;
    type Error = CloudObjectError;

    fn assign_id(seq: u32, _params: &CloudObjectCreate) -> ObjectId {
        ObjectId::from(seq)
    }

    fn from_create_params(id: ObjectId, params: CloudObjectCreate) -> Result<Self, CloudObjectError> {
        let health_response =
            (params.spec.kind() == ResourceKind::Service).then_some(DEFAULT_HEALTH_RESPONSE);
        let object = CloudObject {
            id,
            attributes: attributes::compute(id, &params.unit, &params.logical_id, &params.spec, 1),
            unit: params.unit,
            logical_id: params.logical_id,
            spec: params.spec,
            revision: 1,
            health_response,
        };
        object.validate()?;
        Ok(object)
    }

    async fn on_create(&mut self, ctx: &RepositoryClient) -> Result<(), CloudObjectError> {
        self.check_images(ctx).await
    }

    async fn on_update(
        &mut self,
        update: CloudObjectUpdate,
        ctx: &RepositoryClient,
    ) -> Result<(), CloudObjectError> {
        if update.spec.kind() != self.kind() {
            return Err(self.invalid(format!("cannot change kind to {}", update.spec.kind())));
        }
        let previous = std::mem::replace(&mut self.spec, update.spec);
        let checked = match self.validate() {
            Ok(()) => self.check_images(ctx).await,
            Err(e) => Err(e),
        };
        if let Err(e) = checked {
            self.spec = previous;
            return Err(e);
        }
        self.revision += 1;
        self.attributes =
            attributes::compute(self.id, &self.unit, &self.logical_id, &self.spec, self.revision);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CloudObjectAction,
        _ctx: &RepositoryClient,
    ) -> Result<CloudObjectActionResult, CloudObjectError> {
        let Some(current) = self.health_response else {
            return Err(CloudObjectError::NotATarget(self.logical_id.to_string()));
        };
        match action {
            CloudObjectAction::SetHealthResponse(status) => {
                self.health_response = Some(status);
                Ok(CloudObjectActionResult::HealthResponse(status))
            }
            CloudObjectAction::Probe => Ok(CloudObjectActionResult::HealthResponse(current)),
        }
    }
}
