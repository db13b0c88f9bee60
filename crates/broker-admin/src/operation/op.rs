// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Management operations and their results.

use crate::model::validate::ValidationError;
use crate::model::PathAddress;
use crate::operation::error::OperationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ADD: &str = "add";
pub const REMOVE: &str = "remove";
pub const READ_ATTRIBUTE: &str = "read-attribute";
pub const WRITE_ATTRIBUTE: &str = "write-attribute";
pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";
pub const READ_RESOURCE: &str = "read-resource";

pub const NAME: &str = "name";
pub const VALUE: &str = "value";
pub const RECURSIVE: &str = "recursive";
pub const INCLUDE_RUNTIME: &str = "include-runtime";

/// One management operation.
///
/// JSON form: `{"operation": "add", "address": "/subsystem=...", ...params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operation")]
    pub name: String,
    pub address: PathAddress,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Operation {
    /// Create a new operation without parameters.
    pub fn new(name: &str, address: PathAddress) -> Self {
        Self {
            name: name.to_string(),
            address,
            params: Map::new(),
        }
    }

    /// `add` with the attributes of a JSON object.
    pub fn add(address: PathAddress, attributes: Value) -> Self {
        let mut op = Self::new(ADD, address);
        if let Value::Object(map) = attributes {
            op.params = map;
        }
        op
    }

    pub fn remove(address: PathAddress) -> Self {
        Self::new(REMOVE, address)
    }

    pub fn read_attribute(address: PathAddress, name: &str) -> Self {
        Self::new(READ_ATTRIBUTE, address).with_param(NAME, name)
    }

    pub fn write_attribute(address: PathAddress, name: &str, value: impl Into<Value>) -> Self {
        Self::new(WRITE_ATTRIBUTE, address)
            .with_param(NAME, name)
            .with_param(VALUE, value)
    }

    pub fn undefine_attribute(address: PathAddress, name: &str) -> Self {
        Self::new(UNDEFINE_ATTRIBUTE, address).with_param(NAME, name)
    }

    pub fn read_resource(address: PathAddress) -> Self {
        Self::new(READ_RESOURCE, address)
    }

    /// Set a parameter.
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Required string parameter.
    pub fn param_str(&self, name: &str) -> Result<&str, OperationError> {
        self.params
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MissingRequired(name.to_string()).into())
    }

    pub fn flag(&self, name: &str) -> bool {
        self.params
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Same operation against another address.
    pub fn retarget(&self, address: PathAddress) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }
}

/// Final outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
}

/// Result returned to the management client.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(rename = "failure-description", skip_serializing_if = "Option::is_none")]
    pub failure_description: Option<String>,
    #[serde(rename = "reload-required", skip_serializing_if = "std::ops::Not::not")]
    pub reload_required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub error: Option<OperationError>,
}

impl OperationResult {
    pub fn success(result: Value, reload_required: bool, warnings: Vec<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            result,
            failure_description: None,
            reload_required,
            warnings,
            error: None,
        }
    }

    pub fn failed(error: OperationError) -> Self {
        Self {
            outcome: Outcome::Failed,
            result: Value::Null,
            failure_description: Some(error.to_string()),
            reload_required: false,
            warnings: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let op: Operation = serde_json::from_value(json!({
            "operation": "write-attribute",
            "address": "/subsystem=messaging-activemq/server=default",
            "name": "statistics-enabled",
            "value": true,
        }))
        .expect("parse");
        assert_eq!(op.name, WRITE_ATTRIBUTE);
        assert_eq!(op.address, PathAddress::server("default"));
        assert_eq!(op.param_str(NAME).expect("name"), "statistics-enabled");
        assert_eq!(op.param(VALUE), Some(&json!(true)));
    }

    #[test]
    fn test_missing_param() {
        let op = Operation::new(READ_ATTRIBUTE, PathAddress::server("default"));
        assert!(matches!(
            op.param_str(NAME),
            Err(OperationError::Validation(ValidationError::MissingRequired(_)))
        ));
    }

    #[test]
    fn test_result_serialization() {
        let ok = OperationResult::success(Value::Null, true, vec![]);
        assert_eq!(
            ok.to_json(),
            json!({"outcome": "success", "reload-required": true})
        );

        let failed = OperationResult::failed(OperationError::NotFound("q".into()));
        assert_eq!(
            failed.to_json(),
            json!({"outcome": "failed", "failure-description": "Not found: q"})
        );
    }
}
