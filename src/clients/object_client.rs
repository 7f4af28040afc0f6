//! # Cloud Object Client
//!
//! High-level API for everything that is neither a repository nor a parameter.

use crate::cloud::{
    CloudObject, CloudObjectAction, CloudObjectActionResult, CloudObjectCreate, CloudObjectError,
    CloudObjectUpdate, ObjectId,
};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::ResourceSpec;
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CloudObjectClient {
    inner: ResourceClient<CloudObject>,
}

impl CloudObjectClient {
    pub fn new(inner: ResourceClient<CloudObject>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<CloudObject> for CloudObjectClient {
    type Error = CloudObjectError;

    fn inner(&self) -> &ResourceClient<CloudObject> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => CloudObjectError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<CloudObjectError>() {
                Ok(err) => *err,
                Err(other) => CloudObjectError::ActorCommunicationError(other.to_string()),
            },
            other => CloudObjectError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl CloudObjectClient {
    #[instrument(skip(self, params), fields(logical_id = %params.logical_id))]
    pub async fn create_object(&self, params: CloudObjectCreate) -> Result<ObjectId, CloudObjectError> {
        debug!(?params, "Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, spec))]
    pub async fn update_object(
        &self,
        id: ObjectId,
        spec: ResourceSpec,
    ) -> Result<CloudObject, CloudObjectError> {
        debug!(?spec, "Sending request");
        self.inner
            .update(id, CloudObjectUpdate { spec })
            .await
            .map_err(Self::map_error)
    }

    /// Makes a service answer health probes with `status`.
    #[instrument(skip(self))]
    pub async fn set_health_response(&self, id: ObjectId, status: u16) -> Result<u16, CloudObjectError> {
        self.health_action(id, CloudObjectAction::SetHealthResponse(status)).await
    }

    /// The status a service currently answers health probes with.
    #[instrument(skip(self))]
    pub async fn probe(&self, id: ObjectId) -> Result<u16, CloudObjectError> {
        self.health_action(id, CloudObjectAction::Probe).await
    }

    async fn health_action(
        &self,
        id: ObjectId,
        action: CloudObjectAction,
    ) -> Result<u16, CloudObjectError> {
        debug!("Sending {:?} to {}", action, id);
        match self
            .inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)?
        {
            CloudObjectActionResult::HealthResponse(status) => Ok(status),
        }
    }
}
