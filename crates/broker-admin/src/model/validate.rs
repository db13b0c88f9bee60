// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Payload validation against resource descriptors.
//!
//! Values are stored as written (expressions kept, correctors applied) and
//! resolved to typed values when the runtime needs them.

use crate::model::attribute::{AttributeDefinition, AttributeKind};
use crate::model::descriptor::{ResourceDescriptor, ResourceType};
use crate::model::expression::{is_expression, ExpressionError, ExpressionResolver};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Validation errors. Always raised before any runtime effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{attribute}' is not an attribute of {resource}")]
    UndeclaredAttribute {
        resource: ResourceType,
        attribute: String,
    },

    #[error("Required attribute '{0}' is not defined")]
    MissingRequired(String),

    #[error("Attribute '{attribute}' expects {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid value '{value}' for '{attribute}', allowed: {allowed}")]
    NotAllowed {
        attribute: String,
        value: String,
        allowed: String,
    },

    #[error("Value {value} of '{attribute}' is outside [{min}, {max}]")]
    OutOfRange {
        attribute: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Attribute '{attribute}' cannot be defined together with '{other}'")]
    Conflict { attribute: String, other: String },

    #[error("One of [{0}] must be defined")]
    MissingAlternative(String),

    #[error("Attribute '{attribute}': {source}")]
    Unresolvable {
        attribute: String,
        #[source]
        source: ExpressionError,
    },
}

fn mismatch(attr: &AttributeDefinition, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        attribute: attr.name.to_string(),
        expected: attr.kind.as_str(),
        found: found.to_string(),
    }
}

fn as_integer(attr: &AttributeDefinition, value: &Value) -> Result<i64, ValidationError> {
    let n = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| mismatch(attr, value))?;

    if attr.kind == AttributeKind::Int && i32::try_from(n).is_err() {
        return Err(mismatch(attr, value));
    }
    if let Some((min, max)) = attr.range {
        if n < min || n > max {
            return Err(ValidationError::OutOfRange {
                attribute: attr.name.to_string(),
                value: n,
                min,
                max,
            });
        }
    }
    Ok(n)
}

fn as_bool(attr: &AttributeDefinition, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(mismatch(attr, value)),
    }
}

fn as_string(attr: &AttributeDefinition, value: &Value) -> Result<String, ValidationError> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(mismatch(attr, value)),
    };
    if !attr.allowed.is_empty() && !attr.allowed.contains(&s.as_str()) {
        return Err(ValidationError::NotAllowed {
            attribute: attr.name.to_string(),
            value: s,
            allowed: attr.allowed.join(", "),
        });
    }
    Ok(s)
}

fn typed(attr: &AttributeDefinition, value: &Value) -> Result<Value, ValidationError> {
    match attr.kind {
        AttributeKind::Int | AttributeKind::Long => as_integer(attr, value).map(Value::from),
        AttributeKind::Boolean => as_bool(attr, value).map(Value::Bool),
        AttributeKind::String => as_string(attr, value).map(Value::String),
        AttributeKind::StringList => match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
            _ => Err(mismatch(attr, value)),
        },
        AttributeKind::Properties => match value {
            Value::Object(map) if map.values().all(Value::is_string) => Ok(value.clone()),
            _ => Err(mismatch(attr, value)),
        },
    }
}

/// Resolve a stored value into its typed runtime form.
pub fn resolve_value(
    attr: &AttributeDefinition,
    value: &Value,
    resolver: &ExpressionResolver,
) -> Result<Value, ValidationError> {
    match value {
        Value::String(s) if attr.allow_expression && is_expression(s) => {
            let resolved = resolver
                .resolve_str(s)
                .map_err(|source| ValidationError::Unresolvable {
                    attribute: attr.name.to_string(),
                    source,
                })?;
            let resolved = typed(attr, &Value::String(resolved))?;
            Ok(match (attr.corrector, resolved) {
                (Some(corrector), Value::String(s)) => Value::String(corrector.apply(&s)),
                (_, other) => other,
            })
        }
        _ => typed(attr, value),
    }
}

/// Check one value and return the form to store.
pub fn validate_value(
    attr: &AttributeDefinition,
    value: &Value,
    resolver: &ExpressionResolver,
) -> Result<Value, ValidationError> {
    if let Value::String(s) = value {
        if attr.allow_expression && is_expression(s) {
            resolve_value(attr, value, resolver)?;
            return Ok(value.clone());
        }
    }
    let stored = typed(attr, value)?;
    Ok(match (attr.corrector, stored) {
        (Some(corrector), Value::String(s)) => Value::String(corrector.apply(&s)),
        (_, other) => other,
    })
}

/// Enforce required attributes and the alternative groups.
pub fn check_constraints(
    descriptor: &ResourceDescriptor,
    attributes: &BTreeMap<String, Value>,
) -> Result<(), ValidationError> {
    for attr in descriptor.configuration_attributes() {
        let defined = attributes.contains_key(attr.name);
        if attr.required && !defined {
            return Err(ValidationError::MissingRequired(attr.name.to_string()));
        }
        if defined {
            if let Some(other) = attr
                .alternatives
                .iter()
                .find(|alt| attributes.contains_key(**alt))
            {
                return Err(ValidationError::Conflict {
                    attribute: attr.name.to_string(),
                    other: other.to_string(),
                });
            }
        }
    }

    for group in descriptor.one_of {
        if !group.iter().any(|name| attributes.contains_key(*name)) {
            return Err(ValidationError::MissingAlternative(group.join(", ")));
        }
    }
    Ok(())
}

fn configuration_attribute(
    descriptor: &ResourceDescriptor,
    name: &str,
) -> Result<&'static AttributeDefinition, ValidationError> {
    descriptor
        .attribute(name)
        .filter(|a| !a.is_runtime())
        .ok_or_else(|| ValidationError::UndeclaredAttribute {
            resource: descriptor.kind,
            attribute: name.to_string(),
        })
}

/// Validate an add payload and build the attribute set to store.
///
/// Undefined (`null`) entries are skipped.
pub fn validate_and_populate(
    descriptor: &ResourceDescriptor,
    params: &Map<String, Value>,
    resolver: &ExpressionResolver,
) -> Result<BTreeMap<String, Value>, ValidationError> {
    let mut attributes = BTreeMap::new();
    for (name, value) in params {
        let attr = configuration_attribute(descriptor, name)?;
        if value.is_null() {
            continue;
        }
        attributes.insert(name.clone(), validate_value(attr, value, resolver)?);
    }
    check_constraints(descriptor, &attributes)?;
    Ok(attributes)
}

/// Validate a single attribute update against the current attribute set.
///
/// Returns the value to store (`Value::Null` undefines the attribute).
pub fn validate_write(
    descriptor: &ResourceDescriptor,
    current: &BTreeMap<String, Value>,
    name: &str,
    value: &Value,
    resolver: &ExpressionResolver,
) -> Result<Value, ValidationError> {
    let attr = configuration_attribute(descriptor, name)?;
    let stored = if value.is_null() {
        Value::Null
    } else {
        validate_value(attr, value, resolver)?
    };

    let mut updated = current.clone();
    if stored.is_null() {
        updated.remove(name);
    } else {
        updated.insert(name.to_string(), stored.clone());
    }
    check_constraints(descriptor, &updated)?;
    Ok(stored)
}

/// Typed value of an attribute on a stored attribute set, falling back to
/// the default. `Value::Null` when neither is defined.
pub fn resolved_attribute(
    descriptor: &ResourceDescriptor,
    attributes: &BTreeMap<String, Value>,
    name: &str,
    resolver: &ExpressionResolver,
) -> Result<Value, ValidationError> {
    let attr = configuration_attribute(descriptor, name)?;
    match attributes.get(name) {
        Some(value) => resolve_value(attr, value, resolver),
        None => Ok(attr.default_value().unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn resolver() -> ExpressionResolver {
        let mut r = ExpressionResolver::default();
        r.set_property("period", "5000");
        r.set_property("dlq", "jms.queue.DLQ");
        r
    }

    #[test]
    fn test_populate_corrects_addresses() {
        let attrs = validate_and_populate(
            ResourceType::Divert.descriptor(),
            &params(json!({
                "divert-address": "jms.queue.orders",
                "forwarding-address": "audit",
            })),
            &resolver(),
        )
        .expect("valid");
        assert_eq!(attrs["divert-address"], json!("orders"));
        assert_eq!(attrs["forwarding-address"], json!("audit"));
    }

    #[test]
    fn test_missing_required() {
        let err = validate_and_populate(
            ResourceType::Divert.descriptor(),
            &params(json!({"divert-address": "a"})),
            &resolver(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired("forwarding-address".into())
        );
    }

    #[test]
    fn test_undeclared_and_runtime_attributes_rejected() {
        let descriptor = ResourceType::Queue.descriptor();
        for name in ["bogus", "message-count"] {
            let mut payload = params(json!({"queue-address": "q"}));
            payload.insert(name.to_string(), json!(1));
            let err = validate_and_populate(descriptor, &payload, &resolver())
            .unwrap_err();
            assert!(matches!(err, ValidationError::UndeclaredAttribute { .. }));
        }
    }

    #[test]
    fn test_type_and_range() {
        let server = ResourceType::Server.descriptor();
        let attr = server
            .attribute("message-counter-sample-period")
            .expect("declared");
        assert_eq!(
            validate_value(attr, &json!("2000"), &resolver()).expect("numeric string"),
            json!(2000)
        );
        assert!(matches!(
            validate_value(attr, &json!(10), &resolver()),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_value(attr, &json!(true), &resolver()),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_allowed_values() {
        let attr = ResourceType::Server
            .descriptor()
            .attribute("journal-type")
            .expect("declared");
        assert!(validate_value(attr, &json!("NIO"), &resolver()).is_ok());
        assert!(matches!(
            validate_value(attr, &json!("MAPPED"), &resolver()),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_expressions_kept_and_resolved() {
        let attr = ResourceType::Server
            .descriptor()
            .attribute("message-counter-sample-period")
            .expect("declared");
        let stored = validate_value(attr, &json!("${period}"), &resolver()).expect("valid");
        assert_eq!(stored, json!("${period}"));
        assert_eq!(
            resolve_value(attr, &stored, &resolver()).expect("resolve"),
            json!(5000)
        );

        assert!(matches!(
            validate_value(attr, &json!("${unknown}"), &resolver()),
            Err(ValidationError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_resolved_expression_is_corrected() {
        let attr = ResourceType::AddressSetting
            .descriptor()
            .attribute("dead-letter-address")
            .expect("declared");
        assert_eq!(
            resolve_value(attr, &json!("${dlq}"), &resolver()).expect("resolve"),
            json!("DLQ")
        );
    }

    #[test]
    fn test_alternatives_on_add_and_write() {
        let descriptor = ResourceType::ClusterConnection.descriptor();
        let err = validate_and_populate(
            descriptor,
            &params(json!({
                "cluster-connection-address": "jms",
                "connector-name": "netty",
                "static-connectors": ["a"],
                "discovery-group": "dg",
            })),
            &resolver(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Conflict { .. }));

        let current = validate_and_populate(
            descriptor,
            &params(json!({
                "cluster-connection-address": "jms",
                "connector-name": "netty",
                "static-connectors": ["a"],
            })),
            &resolver(),
        )
        .expect("valid");
        assert_eq!(current["cluster-connection-address"], json!(""));
        let err = validate_write(descriptor, &current, "discovery-group", &json!("dg"), &resolver())
            .unwrap_err();
        assert!(matches!(err, ValidationError::Conflict { .. }));
    }

    #[test]
    fn test_one_of_group() {
        let err = validate_and_populate(
            ResourceType::BroadcastGroup.descriptor(),
            &params(json!({"broadcast-period": 1000})),
            &resolver(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingAlternative(_)));
    }

    #[test]
    fn test_undefine_required_rejected() {
        let descriptor = ResourceType::Queue.descriptor();
        let current = validate_and_populate(
            descriptor,
            &params(json!({"queue-address": "q"})),
            &resolver(),
        )
        .expect("valid");
        let err = validate_write(descriptor, &current, "queue-address", &Value::Null, &resolver())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired("queue-address".into()));
    }

    #[test]
    fn test_resolved_attribute_default() {
        let descriptor = ResourceType::Server.descriptor();
        let value = resolved_attribute(
            descriptor,
            &BTreeMap::new(),
            "message-counter-max-day-history",
            &resolver(),
        )
        .expect("resolve");
        assert_eq!(value, json!(10));
    }
}
