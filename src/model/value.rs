//! Property values that may point at other resources.
//!
//! A [`Value::Attribute`] is how a template says "the DNS name of `WorldALB`, once it exists".
//! The engine resolves these in creation order; the set of references is also what makes a
//! resource depend on another.

use crate::model::naming::LogicalId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// An attribute a realized resource exposes to later resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Id,
    Arn,
    Name,
    Uri,
    DnsName,
}

impl Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Id => "Id",
            Attribute::Arn => "Arn",
            Attribute::Name => "Name",
            Attribute::Uri => "Uri",
            Attribute::DnsName => "DnsName",
        };
        f.write_str(name)
    }
}

/// Values known only to the engine that realizes the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pseudo {
    Region,
    AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Literal(String),
    Attribute {
        resource: LogicalId,
        attribute: Attribute,
    },
    Pseudo(Pseudo),
    Join(Vec<Value>),
}

/// A reference that could not be resolved, reported by [`Value::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub resource: LogicalId,
    pub attribute: Attribute,
}

/// What the engine knows while resolving values.
pub trait ResolveContext {
    fn attribute(&self, resource: &LogicalId, attribute: Attribute) -> Option<String>;
    fn pseudo(&self, pseudo: Pseudo) -> String;
}

impl Value {
    pub fn literal(value: impl Into<String>) -> Self {
        Value::Literal(value.into())
    }

    pub fn attr(resource: &LogicalId, attribute: Attribute) -> Self {
        Value::Attribute {
            resource: resource.clone(),
            attribute,
        }
    }

    pub fn join(parts: impl IntoIterator<Item = Value>) -> Self {
        Value::Join(parts.into_iter().collect())
    }

    /// The literal text, if this value needs no resolution.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Resources this value points at, in order of appearance.
    pub fn references(&self) -> Vec<&LogicalId> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a LogicalId>) {
        match self {
            Value::Attribute { resource, .. } => found.push(resource),
            Value::Join(parts) => parts.iter().for_each(|part| part.collect_references(found)),
            Value::Literal(_) | Value::Pseudo(_) => {}
        }
    }

    pub fn resolve(&self, ctx: &dyn ResolveContext) -> Result<String, Unresolved> {
        match self {
            Value::Literal(value) => Ok(value.clone()),
            Value::Attribute {
                resource,
                attribute,
            } => ctx.attribute(resource, *attribute).ok_or_else(|| Unresolved {
                resource: resource.clone(),
                attribute: *attribute,
            }),
            Value::Pseudo(pseudo) => Ok(ctx.pseudo(*pseudo)),
            Value::Join(parts) => parts.iter().map(|part| part.resolve(ctx)).collect(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::literal(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<(LogicalId, Attribute), String>);

    impl ResolveContext for Fixed {
        fn attribute(&self, resource: &LogicalId, attribute: Attribute) -> Option<String> {
            self.0.get(&(resource.clone(), attribute)).cloned()
        }

        fn pseudo(&self, pseudo: Pseudo) -> String {
            match pseudo {
                Pseudo::Region => "local-1".to_string(),
                Pseudo::AccountId => "000000000000".to_string(),
            }
        }
    }

    #[test]
    fn test_join_resolves_in_order() {
        let alb = LogicalId::new("WorldALB");
        let ctx = Fixed(HashMap::from([(
            (alb.clone(), Attribute::DnsName),
            "world.elb.localhost".to_string(),
        )]));

        let url = Value::join([Value::literal("http://"), Value::attr(&alb, Attribute::DnsName)]);
        assert_eq!(url.resolve(&ctx).unwrap(), "http://world.elb.localhost");
        assert_eq!(url.references(), vec![&alb]);
    }

    #[test]
    fn test_missing_attribute_is_unresolved() {
        let ctx = Fixed(HashMap::new());
        let alb = LogicalId::new("WorldALB");
        let err = Value::attr(&alb, Attribute::DnsName).resolve(&ctx).unwrap_err();
        assert_eq!(err.resource, alb);
        assert_eq!(err.attribute, Attribute::DnsName);
    }

    #[test]
    fn test_pseudo_values_have_no_references() {
        let arn = Value::join([
            Value::literal("arn:aws:ssm:"),
            Value::Pseudo(Pseudo::Region),
            Value::literal(":"),
            Value::Pseudo(Pseudo::AccountId),
        ]);
        assert!(arn.references().is_empty());
        assert_eq!(
            arn.resolve(&Fixed(HashMap::new())).unwrap(),
            "arn:aws:ssm:local-1:000000000000"
        );
    }
}
