//! Entity trait implementation for [`Repository`].
//!
//! Repositories are keyed by name, so a create for a name that is already taken is refused by
//! the actor before any hook runs.

use super::actions::{RepositoryAction, RepositoryActionResult};
use super::{Image, Repository, RepositoryCreate, RepositoryError, RepositoryUpdate};
use crate::framework::ActorEntity;
use async_trait::async_trait;
use tracing::debug;

const MAX_NAME_LEN: usize = 256;
const MAX_TAG_LEN: usize = 128;

#[async_trait]
impl ActorEntity for Repository {
    type Id = String;
    type Create = RepositoryCreate;
    type Update = RepositoryUpdate;
    type Action = RepositoryAction;
    type ActionResult = RepositoryActionResult;
    type Context = ();
    type Error = RepositoryError;

    fn assign_id(_seq: u32, params: &RepositoryCreate) -> String {
        params.name.clone()
    }

    /// Names are 2..=256 chars of lowercase letters, digits and `._-/`, starting with a
    /// letter or digit.
    fn from_create_params(id: String, params: RepositoryCreate) -> Result<Self, RepositoryError> {
        let invalid = |reason: &str| RepositoryError::InvalidName {
            name: id.clone(),
            reason: reason.to_string(),
        };
        if id.len() < 2 || id.len() > MAX_NAME_LEN {
            return Err(invalid("must be between 2 and 256 characters"));
        }
        if !id.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(invalid("must start with a lowercase letter or digit"));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/".contains(c))
        {
            return Err(invalid("contains characters outside [a-z0-9._/-]"));
        }
        Ok(Repository::new(id, params.removal_policy))
    }

    async fn on_update(
        &mut self,
        update: RepositoryUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), RepositoryError> {
        if let Some(policy) = update.removal_policy {
            self.removal_policy = policy;
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), RepositoryError> {
        debug!(repository = %self.name, images = self.images.len(), "Discarding images");
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: RepositoryAction,
        _ctx: &Self::Context,
    ) -> Result<RepositoryActionResult, RepositoryError> {
        match action {
            RepositoryAction::PushImage { tag } => {
                if tag.is_empty() || tag.len() > MAX_TAG_LEN || tag.contains(char::is_whitespace) {
                    return Err(RepositoryError::InvalidTag(tag));
                }
                self.pushes += 1;
                let image = Image {
                    digest: format!(
                        "sha256:{:064x}",
                        (u64::from(self.pushes) << 32) | self.name.len() as u64
                    ),
                    tag,
                };
                self.images.retain(|existing| existing.tag != image.tag);
                self.images.push(image.clone());
                Ok(RepositoryActionResult::PushImage(image))
            }
            RepositoryAction::ListImages => Ok(RepositoryActionResult::ListImages(self.images.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RemovalPolicy;

    fn create(name: &str) -> RepositoryCreate {
        RepositoryCreate {
            name: name.to_string(),
            removal_policy: RemovalPolicy::Destroy,
        }
    }

    #[test]
    fn test_names_follow_registry_rules() {
        assert!(Repository::from_create_params("demo-world-app".into(), create("demo-world-app")).is_ok());
        for bad in ["a", "Demo-app", "-demo", "demo app"] {
            assert!(
                matches!(
                    Repository::from_create_params(bad.into(), create(bad)),
                    Err(RepositoryError::InvalidName { .. })
                ),
                "{bad}"
            );
        }
    }

    #[tokio::test]
    async fn test_push_replaces_same_tag() {
        let mut repo = Repository::new("demo-app", RemovalPolicy::Destroy);
        let first = repo
            .handle_action(RepositoryAction::PushImage { tag: "latest".into() }, &())
            .await
            .unwrap();
        let second = repo
            .handle_action(RepositoryAction::PushImage { tag: "latest".into() }, &())
            .await
            .unwrap();
        match (first, second) {
            (RepositoryActionResult::PushImage(a), RepositoryActionResult::PushImage(b)) => {
                assert_ne!(a.digest, b.digest)
            }
            other => panic!("unexpected results: {other:?}"),
        }
        assert_eq!(repo.images.len(), 1);
        assert_eq!(repo.uri(), "000000000000.dkr.ecr.local-1.amazonaws.com/demo-app");
    }

    #[tokio::test]
    async fn test_empty_tag_is_rejected() {
        let mut repo = Repository::new("demo-app", RemovalPolicy::Destroy);
        let result = repo
            .handle_action(RepositoryAction::PushImage { tag: String::new() }, &())
            .await;
        assert_eq!(result.unwrap_err(), RepositoryError::InvalidTag(String::new()));
    }
}
