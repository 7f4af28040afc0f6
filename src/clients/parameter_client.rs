//! # Parameter Client
//!
//! High-level API for the parameter store.

use crate::cloud::{Parameter, ParameterCreate, ParameterError, ParameterUpdate};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::ParameterKey;
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct ParameterClient {
    inner: ResourceClient<Parameter>,
}

impl ParameterClient {
    pub fn new(inner: ResourceClient<Parameter>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Parameter> for ParameterClient {
    type Error = ParameterError;

    fn inner(&self) -> &ResourceClient<Parameter> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(key) => ParameterError::NotFound(key),
            FrameworkError::AlreadyExists(key) => ParameterError::AlreadyExists(key),
            FrameworkError::EntityError(inner) => match inner.downcast::<ParameterError>() {
                Ok(err) => *err,
                Err(other) => ParameterError::ActorCommunicationError(other.to_string()),
            },
            other => ParameterError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl ParameterClient {
    #[instrument(skip(self))]
    pub async fn put_parameter(&self, params: ParameterCreate) -> Result<ParameterKey, ParameterError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_parameter(
        &self,
        key: ParameterKey,
        update: ParameterUpdate,
    ) -> Result<Parameter, ParameterError> {
        debug!("Sending request");
        self.inner.update(key, update).await.map_err(Self::map_error)
    }

    /// The current value, or `None` if the key is not published.
    #[instrument(skip(self))]
    pub async fn get_value(&self, key: ParameterKey) -> Result<Option<String>, ParameterError> {
        Ok(self.get(key).await?.map(|parameter| parameter.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::ParameterTier;
    use crate::framework::mock::MockClient;

    #[tokio::test]
    async fn test_get_value_returns_published_value() {
        let mut mock = MockClient::<Parameter>::new();
        let key = ParameterKey::new("/demo/worldRepositoryName");
        mock.expect_get().return_ok(Some(Parameter {
            key: key.clone(),
            value: "demo-world-app".to_string(),
            description: "The world app repository name".to_string(),
            tier: ParameterTier::Standard,
            version: 1,
        }));
        mock.expect_get().return_ok(None);

        let parameters = ParameterClient::new(mock.client());
        assert_eq!(
            parameters.get_value(key.clone()).await.unwrap().as_deref(),
            Some("demo-world-app")
        );
        assert_eq!(parameters.get_value(key).await.unwrap(), None);
        mock.verify();
    }

    #[tokio::test]
    async fn test_closed_actor_is_a_communication_error() {
        let mut mock = MockClient::<Parameter>::new();
        mock.expect_list().return_err(FrameworkError::ActorClosed);

        let parameters = ParameterClient::new(mock.client());
        assert!(matches!(
            parameters.list().await,
            Err(ParameterError::ActorCommunicationError(_))
        ));
    }
}
