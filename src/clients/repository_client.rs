//! # Repository Client
//!
//! High-level API for the image registry.

use crate::cloud::{
    Image, Repository, RepositoryAction, RepositoryActionResult, RepositoryCreate, RepositoryError,
    RepositoryUpdate,
};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct RepositoryClient {
    inner: ResourceClient<Repository>,
}

impl RepositoryClient {
    pub fn new(inner: ResourceClient<Repository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Repository> for RepositoryClient {
    type Error = RepositoryError;

    fn inner(&self) -> &ResourceClient<Repository> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(name) => RepositoryError::NotFound(name),
            FrameworkError::AlreadyExists(name) => RepositoryError::AlreadyExists(name),
            FrameworkError::EntityError(inner) => match inner.downcast::<RepositoryError>() {
                Ok(err) => *err,
                Err(other) => RepositoryError::ActorCommunicationError(other.to_string()),
            },
            other => RepositoryError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl RepositoryClient {
    #[instrument(skip(self))]
    pub async fn create_repository(&self, params: RepositoryCreate) -> Result<String, RepositoryError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_repository(
        &self,
        name: String,
        update: RepositoryUpdate,
    ) -> Result<Repository, RepositoryError> {
        debug!("Sending request");
        self.inner.update(name, update).await.map_err(Self::map_error)
    }

    /// Pushes an image and returns it with its digest.
    #[instrument(skip(self))]
    pub async fn push_image(&self, name: String, tag: String) -> Result<Image, RepositoryError> {
        debug!("Pushing {} to {}", tag, name);
        match self
            .inner
            .perform_action(name, RepositoryAction::PushImage { tag })
            .await
            .map_err(Self::map_error)?
        {
            RepositoryActionResult::PushImage(image) => Ok(image),
            other => Err(RepositoryError::ActorCommunicationError(format!(
                "PushImage answered with {other:?}"
            ))),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_images(&self, name: String) -> Result<Vec<Image>, RepositoryError> {
        debug!("Listing images of {}", name);
        match self
            .inner
            .perform_action(name, RepositoryAction::ListImages)
            .await
            .map_err(Self::map_error)?
        {
            RepositoryActionResult::ListImages(images) => Ok(images),
            other => Err(RepositoryError::ActorCommunicationError(format!(
                "ListImages answered with {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, expect_create, MockClient};
    use crate::model::RemovalPolicy;

    #[tokio::test]
    async fn test_push_image_sends_tag() {
        let (client, mut receiver) = create_mock_client::<Repository>(10);
        let repositories = RepositoryClient::new(client);

        let push = tokio::spawn(async move {
            repositories
                .push_image("demo-app".to_string(), "latest".to_string())
                .await
        });

        let (name, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(name, "demo-app");
        match action {
            RepositoryAction::PushImage { tag } => assert_eq!(tag, "latest"),
            other => panic!("Expected PushImage, got {other:?}"),
        }
        let image = Image {
            tag: "latest".to_string(),
            digest: "sha256:01".to_string(),
        };
        responder
            .send(Ok(RepositoryActionResult::PushImage(image.clone())))
            .unwrap();

        assert_eq!(push.await.unwrap().unwrap(), image);
    }

    #[tokio::test]
    async fn test_taken_name_maps_to_already_exists() {
        let (client, mut receiver) = create_mock_client::<Repository>(10);
        let repositories = RepositoryClient::new(client);

        let create = tokio::spawn(async move {
            repositories
                .create_repository(RepositoryCreate {
                    name: "demo-app".to_string(),
                    removal_policy: RemovalPolicy::Destroy,
                })
                .await
        });

        let (params, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        responder
            .send(Err(FrameworkError::AlreadyExists(params.name)))
            .unwrap();

        assert_eq!(
            create.await.unwrap(),
            Err(RepositoryError::AlreadyExists("demo-app".to_string()))
        );
    }

    #[tokio::test]
    async fn test_entity_errors_are_unboxed() {
        let mut mock = MockClient::<Repository>::new();
        mock.expect_action()
            .return_err(FrameworkError::EntityError(Box::new(RepositoryError::InvalidTag(
                String::new(),
            ))));

        let repositories = RepositoryClient::new(mock.client());
        let result = repositories
            .push_image("demo-app".to_string(), String::new())
            .await;
        assert_eq!(result, Err(RepositoryError::InvalidTag(String::new())));
        mock.verify();
    }
}
