//! # Local Engine
//!
//! An in-process [`ProvisioningEngine`] built on the simulated cloud services.
//!
//! ```text
//!   LocalEngine ──► RepositoryClient ──► ResourceActor<Repository>
//!               ├─► ParameterClient  ──► ResourceActor<Parameter>
//!               └─► CloudObjectClient ─► ResourceActor<CloudObject> ──(context)──► RepositoryClient
//! ```
//!
//! ## Reconciliation
//!
//! For every unit the engine remembers what it realized: the resolved spec, the handle in the
//! backing service and the attributes it exposes. Deploying a template walks it in creation
//! order, resolves each resource's references against what is already realized and compares
//! the result with the stored spec:
//!
//! | Stored | Resolved spec | Change |
//! |---|---|---|
//! | none | | `Create` |
//! | present | equal | `NoChange` |
//! | present | differs, same physical name | `Update` (in place) |
//! | present | differs, new physical name | `Replace` |
//! | present, no longer declared | | `Delete` |
//!
//! Deletes run last, newest first. If anything fails before that, the resources created in the
//! attempt are deleted again, in-place updates are reverted and the stored state is untouched.
//! Retired resources wait in a queue apart from the live set; a delete that fails stays queued
//! and is retried by the next deploy or destroy of the unit.
//!
//! Named resources (repositories, parameters, clusters) that already exist outside the unit
//! are collisions; the engine never adopts them.

use crate::clients::{CloudObjectClient, ParameterClient, RepositoryClient};
use crate::cloud::{
    self, CloudObject, CloudObjectCreate, CloudObjectError, ObjectId, ParameterCreate,
    ParameterError, ParameterUpdate, Repository, RepositoryCreate, RepositoryError,
    RepositoryUpdate, LOCAL_ACCOUNT_ID, LOCAL_REGION,
};
use crate::engine::{
    Change, ChangeKind, Operation, ProvisioningEngine, ProvisioningError, TeardownReport,
    UnitReport,
};
use crate::framework::ActorClient;
use crate::model::{
    Attribute, LogicalId, ParameterKey, Pseudo, RemovalPolicy, Resource, ResourceKind,
    ResourceSpec, ResolveContext, UnitName, UnitTemplate, Value,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where a realized resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Handle {
    Repository(String),
    Parameter(ParameterKey),
    Object(ObjectId),
}

#[derive(Debug, Clone)]
struct Realized {
    logical_id: LogicalId,
    spec: ResourceSpec,
    handle: Handle,
    attributes: BTreeMap<Attribute, String>,
}

impl Realized {
    fn physical_name(&self) -> String {
        match &self.handle {
            Handle::Repository(name) => name.clone(),
            Handle::Parameter(key) => key.to_string(),
            Handle::Object(id) => self
                .attributes
                .get(&Attribute::Name)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct StackState {
    resources: Vec<Realized>,
    /// No longer declared, but still live in a backing service.
    pending_delete: Vec<Realized>,
}

impl StackState {
    /// Installs a reconciled resource set. Retired resources queue behind any that are
    /// still waiting from an earlier deploy.
    fn commit(&mut self, resources: Vec<Realized>, retired: Vec<Realized>) {
        self.resources = resources;
        self.pending_delete.extend(retired);
    }
}

/// Attributes of resources realized so far, for [`Value::resolve`].
struct Realm<'a>(&'a [Realized]);

impl ResolveContext for Realm<'_> {
    fn attribute(&self, resource: &LogicalId, attribute: Attribute) -> Option<String> {
        self.0
            .iter()
            .find(|realized| &realized.logical_id == resource)
            .and_then(|realized| realized.attributes.get(&attribute).cloned())
    }

    fn pseudo(&self, pseudo: Pseudo) -> String {
        match pseudo {
            Pseudo::Region => LOCAL_REGION.to_string(),
            Pseudo::AccountId => LOCAL_ACCOUNT_ID.to_string(),
        }
    }
}

/// Something to take back if the attempt fails.
enum Undo {
    Delete(LogicalId, Handle),
    Restore(Realized),
}

/// What a front door did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Forwarded to a target whose health check passes.
    Forwarded {
        unit: UnitName,
        service: LogicalId,
        status: u16,
    },
    /// The front door exists but has no healthy target.
    NoHealthyTarget,
    /// No front door answers on this address.
    UnknownHost,
}

/// Simulated cloud services plus the state of every deployed unit.
pub struct LocalEngine {
    repositories: RepositoryClient,
    parameters: ParameterClient,
    objects: CloudObjectClient,
    stacks: Mutex<HashMap<UnitName, Arc<Mutex<StackState>>>>,
    handles: Vec<JoinHandle<()>>,
}

impl LocalEngine {
    /// Spawns the cloud service actors. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (repository_actor, repositories) = cloud::repository::new();
        let (parameter_actor, parameters) = cloud::parameter::new();
        let (object_actor, objects) = cloud::object::new();

        let handles = vec![
            tokio::spawn(repository_actor.run(())),
            tokio::spawn(parameter_actor.run(())),
            tokio::spawn(object_actor.run(repositories.clone())),
        ];

        Self {
            repositories,
            parameters,
            objects,
            stacks: Mutex::new(HashMap::new()),
            handles,
        }
    }

    /// Drops the clients and waits for every actor to stop.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down cloud services");
        drop(self.repositories);
        drop(self.parameters);
        drop(self.objects);
        for handle in self.handles {
            handle.await.map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Pushes an image into a repository, as a build pipeline would.
    pub async fn push_image(&self, repository: &str, tag: &str) -> Result<cloud::Image, ProvisioningError> {
        self.repositories
            .push_image(repository.to_string(), tag.to_string())
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))
    }

    pub async fn repository(&self, name: &str) -> Result<Option<Repository>, ProvisioningError> {
        self.repositories
            .get(name.to_string())
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))
    }

    /// Names of every repository in the registry, sorted.
    pub async fn repositories(&self) -> Result<Vec<String>, ProvisioningError> {
        let mut names: Vec<String> = self
            .repositories
            .list()
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))?
            .into_iter()
            .map(|repository| repository.name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Logical ids and kinds a unit currently owns, in creation order.
    pub async fn resources(&self, unit: &UnitName) -> Vec<(LogicalId, ResourceKind)> {
        let Some(stack) = self.stacks.lock().await.get(unit).cloned() else {
            return Vec::new();
        };
        let state = stack.lock().await;
        state
            .resources
            .iter()
            .map(|realized| (realized.logical_id.clone(), realized.spec.kind()))
            .collect()
    }

    /// Makes a deployed service answer its health checks with `status`.
    pub async fn set_health_response(
        &self,
        unit: &UnitName,
        service: &LogicalId,
        status: u16,
    ) -> Result<(), ProvisioningError> {
        let id = self.object_id(unit, service).await?;
        self.objects
            .set_health_response(id, status)
            .await
            .map_err(|e| object_error(service, Operation::Update, e))?;
        Ok(())
    }

    /// Sends a request to the front door answering on `dns_name`.
    ///
    /// The request goes to the first target, in listener order, whose answer to the target
    /// group's health check is accepted. Targets failing the check never receive it.
    pub async fn route(&self, dns_name: &str) -> Result<Route, ProvisioningError> {
        let objects = self
            .objects
            .list()
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))?;
        let by_arn = |kind: ResourceKind, arn: &str| {
            objects
                .iter()
                .find(|o| o.kind() == kind && o.attribute(Attribute::Arn) == Some(arn))
        };

        let Some(load_balancer) = objects.iter().find(|o| {
            o.kind() == ResourceKind::LoadBalancer && o.attribute(Attribute::DnsName) == Some(dns_name)
        }) else {
            return Ok(Route::UnknownHost);
        };
        let lb_arn = load_balancer.attribute(Attribute::Arn);

        let mut listeners: Vec<&CloudObject> = objects
            .iter()
            .filter(|o| match &o.spec {
                ResourceSpec::Listener { load_balancer, .. } => load_balancer.as_literal() == lb_arn,
                _ => false,
            })
            .collect();
        listeners.sort_by_key(|o| o.id);

        for listener in listeners {
            let ResourceSpec::Listener { target_group, .. } = &listener.spec else {
                continue;
            };
            let Some(tg_arn) = target_group.as_literal() else {
                continue;
            };
            let Some(group) = by_arn(ResourceKind::TargetGroup, tg_arn) else {
                continue;
            };
            let ResourceSpec::TargetGroup { health_check, .. } = &group.spec else {
                continue;
            };
            for attachment in objects.iter().filter(|o| match &o.spec {
                ResourceSpec::TargetAttachment { target_group, .. } => {
                    target_group.as_literal() == Some(tg_arn)
                }
                _ => false,
            }) {
                let ResourceSpec::TargetAttachment { service, .. } = &attachment.spec else {
                    continue;
                };
                let Some(service) = service
                    .as_literal()
                    .and_then(|arn| by_arn(ResourceKind::Service, arn))
                else {
                    continue;
                };
                let status = self
                    .objects
                    .probe(service.id)
                    .await
                    .map_err(|e| ProvisioningError::Backend(e.to_string()))?;
                if health_check.accepts(status) {
                    debug!(service = %service.logical_id, status, "Target healthy");
                    return Ok(Route::Forwarded {
                        unit: service.unit.clone(),
                        service: service.logical_id.clone(),
                        status,
                    });
                }
                debug!(service = %service.logical_id, status, path = %health_check.path, "Target unhealthy");
            }
        }
        Ok(Route::NoHealthyTarget)
    }

    async fn stack(&self, unit: &UnitName) -> Arc<Mutex<StackState>> {
        self.stacks
            .lock()
            .await
            .entry(unit.clone())
            .or_default()
            .clone()
    }

    async fn object_id(&self, unit: &UnitName, logical_id: &LogicalId) -> Result<ObjectId, ProvisioningError> {
        let stack = self.stack(unit).await;
        let state = stack.lock().await;
        state
            .resources
            .iter()
            .find(|realized| &realized.logical_id == logical_id)
            .and_then(|realized| match realized.handle {
                Handle::Object(id) => Some(id),
                _ => None,
            })
            .ok_or_else(|| {
                ProvisioningError::InvalidTemplate(format!("`{logical_id}` is not deployed in `{unit}`"))
            })
    }

    /// Fails if another unit (or nobody) already owns a cloud object with this physical name.
    async fn check_object_collision(
        &self,
        unit: &UnitName,
        resource: &LogicalId,
        spec: &ResourceSpec,
    ) -> Result<(), ProvisioningError> {
        let Some(name) = spec.physical_name() else {
            return Ok(());
        };
        let existing = self
            .objects
            .list()
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))?;
        let taken = existing.iter().any(|o| {
            o.kind() == spec.kind()
                && o.attribute(Attribute::Name) == Some(name)
                && !(&o.unit == unit && &o.logical_id == resource)
        });
        if taken {
            return Err(ProvisioningError::Collision {
                kind: spec.kind(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn create(
        &self,
        unit: &UnitName,
        resource: &LogicalId,
        spec: &ResourceSpec,
    ) -> Result<(Handle, BTreeMap<Attribute, String>), ProvisioningError> {
        match spec {
            ResourceSpec::ImageRepository {
                repository_name,
                removal_policy,
            } => {
                let name = self
                    .repositories
                    .create_repository(RepositoryCreate {
                        name: repository_name.clone(),
                        removal_policy: *removal_policy,
                    })
                    .await
                    .map_err(|e| repository_error(resource, Operation::Create, e))?;
                let attributes = repository_attributes(&Repository::new(name.clone(), *removal_policy));
                Ok((Handle::Repository(name), attributes))
            }
            ResourceSpec::Parameter {
                name,
                value,
                description,
                tier,
            } => {
                let key = self
                    .parameters
                    .put_parameter(ParameterCreate {
                        key: name.clone(),
                        value: literal(resource, value)?,
                        description: description.clone(),
                        tier: *tier,
                    })
                    .await
                    .map_err(|e| parameter_error(resource, Operation::Create, e))?;
                let attributes = parameter_attributes(&key);
                Ok((Handle::Parameter(key), attributes))
            }
            _ => {
                self.check_object_collision(unit, resource, spec).await?;
                let id = self
                    .objects
                    .create_object(CloudObjectCreate {
                        unit: unit.clone(),
                        logical_id: resource.clone(),
                        spec: spec.clone(),
                    })
                    .await
                    .map_err(|e| object_error(resource, Operation::Create, e))?;
                let object = self
                    .objects
                    .get(id)
                    .await
                    .map_err(|e| object_error(resource, Operation::Create, e))?
                    .ok_or_else(|| ProvisioningError::Backend(format!("{id} vanished after create")))?;
                Ok((Handle::Object(id), object.attributes))
            }
        }
    }

    async fn update(
        &self,
        resource: &LogicalId,
        handle: &Handle,
        spec: &ResourceSpec,
    ) -> Result<BTreeMap<Attribute, String>, ProvisioningError> {
        match (handle, spec) {
            (Handle::Repository(name), ResourceSpec::ImageRepository { removal_policy, .. }) => {
                let repository = self
                    .repositories
                    .update_repository(
                        name.clone(),
                        RepositoryUpdate {
                            removal_policy: Some(*removal_policy),
                        },
                    )
                    .await
                    .map_err(|e| repository_error(resource, Operation::Update, e))?;
                Ok(repository_attributes(&repository))
            }
            (
                Handle::Parameter(key),
                ResourceSpec::Parameter {
                    value, description, ..
                },
            ) => {
                self.parameters
                    .update_parameter(
                        key.clone(),
                        ParameterUpdate {
                            value: Some(literal(resource, value)?),
                            description: Some(description.clone()),
                        },
                    )
                    .await
                    .map_err(|e| parameter_error(resource, Operation::Update, e))?;
                Ok(parameter_attributes(key))
            }
            (Handle::Object(id), _) => {
                let object = self
                    .objects
                    .update_object(*id, spec.clone())
                    .await
                    .map_err(|e| object_error(resource, Operation::Update, e))?;
                Ok(object.attributes)
            }
            _ => Err(ProvisioningError::Rejected {
                resource: resource.clone(),
                operation: Operation::Update,
                reason: format!("cannot change kind to {}", spec.kind()),
            }),
        }
    }

    /// Deleting something that is already gone succeeds.
    async fn delete(&self, resource: &LogicalId, handle: &Handle) -> Result<(), ProvisioningError> {
        let result = match handle {
            Handle::Repository(name) => match self.repositories.delete(name.clone()).await {
                Err(RepositoryError::NotFound(_)) => Ok(()),
                other => other.map_err(|e| repository_error(resource, Operation::Delete, e)),
            },
            Handle::Parameter(key) => match self.parameters.delete(key.clone()).await {
                Err(ParameterError::NotFound(_)) => Ok(()),
                other => other.map_err(|e| parameter_error(resource, Operation::Delete, e)),
            },
            Handle::Object(id) => match self.objects.delete(*id).await {
                Err(CloudObjectError::NotFound(_)) => Ok(()),
                other => other.map_err(|e| object_error(resource, Operation::Delete, e)),
            },
        };
        if result.is_ok() {
            info!(resource = %resource, kind = %ChangeKind::Delete, "Reconciled");
        }
        result
    }

    async fn rollback(&self, undo: Vec<Undo>) {
        for step in undo.into_iter().rev() {
            let outcome = match &step {
                Undo::Delete(resource, handle) => self.delete(resource, handle).await,
                Undo::Restore(previous) => self
                    .update(&previous.logical_id, &previous.handle, &previous.spec)
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = outcome {
                warn!(error = %e, "Rollback step failed");
            }
        }
    }

    /// Deletes every queued resource. Failed deletes stay queued for the next deploy or
    /// destroy; the first failure is returned once the queue has been walked.
    async fn delete_pending(&self, state: &mut StackState) -> Result<(), ProvisioningError> {
        let mut failure = None;
        for stale in std::mem::take(&mut state.pending_delete) {
            if stale.spec.removal_policy() == RemovalPolicy::Retain {
                warn!(resource = %stale.logical_id, name = %stale.physical_name(), "Retained, no longer managed");
                continue;
            }
            if let Err(e) = self.delete(&stale.logical_id, &stale.handle).await {
                warn!(resource = %stale.logical_id, error = %e, "Delete failed, still pending");
                state.pending_delete.push(stale);
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Reconciles every declared resource. Returns the new realized set and what to delete.
    async fn apply(
        &self,
        template: &UnitTemplate,
        current: &[Realized],
        changes: &mut Vec<Change>,
        undo: &mut Vec<Undo>,
    ) -> Result<(Vec<Realized>, Vec<Realized>), ProvisioningError> {
        let unit = template.unit();
        let order = template
            .creation_order()
            .map_err(|e| ProvisioningError::InvalidTemplate(e.to_string()))?;

        let mut next: Vec<Realized> = Vec::with_capacity(order.len());
        let mut retired: Vec<Realized> = Vec::new();

        for resource in order {
            let spec = resolve(resource, &Realm(&next))?;
            let previous = current.iter().find(|r| r.logical_id == resource.id);

            let (kind, realized) = match previous {
                Some(previous) if previous.spec == spec => (ChangeKind::NoChange, previous.clone()),
                Some(previous)
                    if previous.spec.kind() == spec.kind()
                        && previous.spec.physical_name() == spec.physical_name() =>
                {
                    let attributes = self.update(&resource.id, &previous.handle, &spec).await?;
                    undo.push(Undo::Restore(previous.clone()));
                    let realized = Realized {
                        logical_id: resource.id.clone(),
                        spec,
                        handle: previous.handle.clone(),
                        attributes,
                    };
                    (ChangeKind::Update, realized)
                }
                _ => {
                    let (handle, attributes) = self.create(unit, &resource.id, &spec).await?;
                    undo.push(Undo::Delete(resource.id.clone(), handle.clone()));
                    if let Some(previous) = previous {
                        retired.push(previous.clone());
                    }
                    let kind = if previous.is_some() {
                        ChangeKind::Replace
                    } else {
                        ChangeKind::Create
                    };
                    let realized = Realized {
                        logical_id: resource.id.clone(),
                        spec,
                        handle,
                        attributes,
                    };
                    (kind, realized)
                }
            };

            info!(resource = %resource.id, kind = %kind, "Reconciled");
            changes.push(Change {
                logical_id: resource.id.clone(),
                kind,
            });
            next.push(realized);
        }

        for stale in current.iter().rev() {
            if template.get(&stale.logical_id).is_none() {
                changes.push(Change {
                    logical_id: stale.logical_id.clone(),
                    kind: ChangeKind::Delete,
                });
                retired.push(stale.clone());
            }
        }
        Ok((next, retired))
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProvisioningEngine for LocalEngine {
    async fn deploy(&self, template: &UnitTemplate) -> Result<UnitReport, ProvisioningError> {
        let unit = template.unit();
        let stack = self.stack(unit).await;
        let mut state = stack.lock().await;
        info!(unit = %unit, resources = template.resources().len(), "Deploying unit");

        let mut changes = Vec::new();
        let mut undo = Vec::new();
        let (next, retired) = match self.apply(template, &state.resources, &mut changes, &mut undo).await {
            Ok(applied) => applied,
            Err(e) => {
                warn!(unit = %unit, error = %e, undo = undo.len(), "Deploy failed, rolling back");
                self.rollback(undo).await;
                return Err(e);
            }
        };

        let outputs = match resolve_outputs(template, &next) {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!(unit = %unit, error = %e, "Outputs unresolved, rolling back");
                self.rollback(undo).await;
                return Err(e);
            }
        };

        state.commit(next, retired);
        self.delete_pending(&mut state).await?;

        let report = UnitReport { changes, outputs };
        info!(
            unit = %unit,
            created = report.count(ChangeKind::Create),
            updated = report.count(ChangeKind::Update),
            unchanged = report.count(ChangeKind::NoChange),
            "Unit deployed"
        );
        Ok(report)
    }

    async fn destroy(&self, unit: &UnitName) -> Result<TeardownReport, ProvisioningError> {
        let Some(stack) = self.stacks.lock().await.get(unit).cloned() else {
            debug!(unit = %unit, "Nothing to destroy");
            return Ok(TeardownReport::default());
        };
        let mut state = stack.lock().await;
        info!(unit = %unit, resources = state.resources.len(), "Destroying unit");
        self.delete_pending(&mut state).await?;

        let mut report = TeardownReport::default();
        while let Some(realized) = state.resources.pop() {
            if realized.spec.removal_policy() == RemovalPolicy::Retain {
                warn!(resource = %realized.logical_id, name = %realized.physical_name(), "Retained");
                report
                    .retained
                    .push((realized.logical_id.clone(), realized.physical_name()));
                continue;
            }
            if let Err(e) = self.delete(&realized.logical_id, &realized.handle).await {
                state.resources.push(realized);
                return Err(e);
            }
            report.deleted.push(realized.logical_id);
        }
        drop(state);
        self.stacks.lock().await.remove(unit);
        Ok(report)
    }

    async fn read_parameter(&self, key: &ParameterKey) -> Result<Option<String>, ProvisioningError> {
        self.parameters
            .get_value(key.clone())
            .await
            .map_err(|e| ProvisioningError::Backend(e.to_string()))
    }
}

fn resolve(resource: &Resource, realm: &Realm<'_>) -> Result<ResourceSpec, ProvisioningError> {
    let mut spec = resource.spec.clone();
    for value in spec.values_mut() {
        let resolved = value
            .resolve(realm)
            .map_err(|missing| ProvisioningError::UnresolvedReference {
                resource: resource.id.clone(),
                target: missing.resource,
                attribute: missing.attribute.to_string(),
            })?;
        *value = Value::Literal(resolved);
    }
    Ok(spec)
}

fn resolve_outputs(
    template: &UnitTemplate,
    realized: &[Realized],
) -> Result<BTreeMap<String, String>, ProvisioningError> {
    let realm = Realm(realized);
    template
        .outputs()
        .iter()
        .map(|output| {
            let value = output.value.resolve(&realm).map_err(|missing| {
                ProvisioningError::UnresolvedReference {
                    resource: LogicalId::new(output.name.as_str()),
                    target: missing.resource,
                    attribute: missing.attribute.to_string(),
                }
            })?;
            Ok((output.name.clone(), value))
        })
        .collect()
}

fn literal(resource: &LogicalId, value: &Value) -> Result<String, ProvisioningError> {
    value
        .as_literal()
        .map(str::to_string)
        .ok_or_else(|| ProvisioningError::InvalidTemplate(format!("`{resource}` was not resolved")))
}

fn repository_attributes(repository: &Repository) -> BTreeMap<Attribute, String> {
    BTreeMap::from([
        (Attribute::Id, repository.name.clone()),
        (Attribute::Name, repository.name.clone()),
        (Attribute::Arn, repository.arn()),
        (Attribute::Uri, repository.uri()),
    ])
}

fn parameter_attributes(key: &ParameterKey) -> BTreeMap<Attribute, String> {
    BTreeMap::from([
        (Attribute::Id, key.to_string()),
        (Attribute::Name, key.to_string()),
        (
            Attribute::Arn,
            format!("arn:aws:ssm:{LOCAL_REGION}:{LOCAL_ACCOUNT_ID}:parameter{key}"),
        ),
    ])
}

fn repository_error(resource: &LogicalId, operation: Operation, e: RepositoryError) -> ProvisioningError {
    match e {
        RepositoryError::AlreadyExists(name) => ProvisioningError::Collision {
            kind: ResourceKind::ImageRepository,
            name,
        },
        RepositoryError::ActorCommunicationError(message) => ProvisioningError::Backend(message),
        other => rejected(resource, operation, other),
    }
}

fn parameter_error(resource: &LogicalId, operation: Operation, e: ParameterError) -> ProvisioningError {
    match e {
        ParameterError::AlreadyExists(name) => ProvisioningError::Collision {
            kind: ResourceKind::Parameter,
            name,
        },
        ParameterError::ActorCommunicationError(message) => ProvisioningError::Backend(message),
        other => rejected(resource, operation, other),
    }
}

fn object_error(resource: &LogicalId, operation: Operation, e: CloudObjectError) -> ProvisioningError {
    match e {
        CloudObjectError::ActorCommunicationError(message) => ProvisioningError::Backend(message),
        other => rejected(resource, operation, other),
    }
}

fn rejected(resource: &LogicalId, operation: Operation, reason: impl ToString) -> ProvisioningError {
    ProvisioningError::Rejected {
        resource: resource.clone(),
        operation,
        reason: reason.to_string(),
    }
}
