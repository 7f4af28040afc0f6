//! Entity trait implementation for [`Parameter`].

use super::{Parameter, ParameterCreate, ParameterError, ParameterTier, ParameterUpdate};
use crate::framework::ActorEntity;
use crate::model::ParameterKey;
use async_trait::async_trait;

const STANDARD_MAX_VALUE_LEN: usize = 4 * 1024;
const ADVANCED_MAX_VALUE_LEN: usize = 8 * 1024;

fn check_value(key: &ParameterKey, tier: ParameterTier, value: &str) -> Result<(), ParameterError> {
    let limit = match tier {
        ParameterTier::Standard => STANDARD_MAX_VALUE_LEN,
        ParameterTier::Advanced => ADVANCED_MAX_VALUE_LEN,
    };
    let reason = if value.is_empty() {
        "value must not be empty".to_string()
    } else if value.len() > limit {
        format!("value exceeds {limit} bytes for the {tier:?} tier")
    } else {
        return Ok(());
    };
    Err(ParameterError::Invalid {
        key: key.to_string(),
        reason,
    })
}

#[async_trait]
impl ActorEntity for Parameter {
    type Id = ParameterKey;
    type Create = ParameterCreate;
    type Update = ParameterUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = ParameterError;

    fn assign_id(_seq: u32, params: &ParameterCreate) -> ParameterKey {
        params.key.clone()
    }

    /// Keys are absolute paths (`/...`) without whitespace.
    fn from_create_params(id: ParameterKey, params: ParameterCreate) -> Result<Self, ParameterError> {
        if !id.as_str().starts_with('/') || id.as_str().contains(char::is_whitespace) {
            return Err(ParameterError::Invalid {
                key: id.to_string(),
                reason: "key must be an absolute path without whitespace".to_string(),
            });
        }
        check_value(&id, params.tier, &params.value)?;
        Ok(Parameter {
            key: id,
            value: params.value,
            description: params.description,
            tier: params.tier,
            version: 1,
        })
    }

    async fn on_update(
        &mut self,
        update: ParameterUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), ParameterError> {
        if let Some(value) = update.value {
            check_value(&self.key, self.tier, &value)?;
            self.value = value;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.version += 1;
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &Self::Context) -> Result<(), ParameterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(key: &str, value: &str) -> ParameterCreate {
        ParameterCreate {
            key: key.into(),
            value: value.to_string(),
            description: String::new(),
            tier: ParameterTier::Standard,
        }
    }

    #[test]
    fn test_relative_key_is_invalid() {
        let err = Parameter::from_create_params("demo/app".into(), create("demo/app", "x")).unwrap_err();
        assert!(matches!(err, ParameterError::Invalid { .. }));
    }

    #[test]
    fn test_standard_tier_limit() {
        let big = "x".repeat(STANDARD_MAX_VALUE_LEN + 1);
        assert!(Parameter::from_create_params("/demo/big".into(), create("/demo/big", &big)).is_err());
        assert!(Parameter::from_create_params("/demo/empty".into(), create("/demo/empty", "")).is_err());
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let mut param =
            Parameter::from_create_params("/demo/appRepositoryName".into(), create("/demo/appRepositoryName", "demo-app"))
                .unwrap();
        param
            .on_update(
                ParameterUpdate {
                    value: Some("demo-app-2".to_string()),
                    description: None,
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(param.value, "demo-app-2");
        assert_eq!(param.version, 2);
    }
}
