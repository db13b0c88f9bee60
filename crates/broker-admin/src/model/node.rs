// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The configuration tree.
//!
//! The model exclusively owns every [`ConfigNode`]. Children keep their
//! insertion order, which is the declaration order consumed at broker
//! bootstrap.

use crate::model::address::{PathAddress, PathElement, SUBSYSTEM_NAME};
use crate::model::descriptor::ResourceType;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Model errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Resource not found: {0}")]
    NotFound(PathAddress),

    #[error("Resource already exists: {0}")]
    Duplicate(PathAddress),

    #[error("Unknown resource type '{0}'")]
    UnknownType(String),

    #[error("'{child}' is not a valid child of {parent}")]
    InvalidChild { parent: PathAddress, child: String },

    #[error("Address {0} is outside the messaging subsystem")]
    OutsideSubsystem(PathAddress),
}

/// One addressed resource with its defined attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    kind: ResourceType,
    name: String,
    attributes: BTreeMap<String, Value>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create a new node without children.
    pub fn new(kind: ResourceType, name: impl Into<String>, attributes: BTreeMap<String, Value>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defined attributes; undefined ones are absent.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Defined value or the declared default.
    pub fn attribute_or_default(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned().or_else(|| {
            self.kind
                .descriptor()
                .attribute(name)
                .and_then(|a| a.default_value())
        })
    }

    /// Set an attribute; `Value::Null` undefines it. Returns the previous value.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Option<Value> {
        if value.is_null() {
            self.attributes.remove(name)
        } else {
            self.attributes.insert(name.to_string(), value)
        }
    }

    pub fn children(&self) -> &[ConfigNode] {
        &self.children
    }

    /// Children of one type, in insertion order.
    pub fn children_of(&self, kind: ResourceType) -> impl Iterator<Item = &ConfigNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn child(&self, kind: ResourceType, name: &str) -> Option<&ConfigNode> {
        self.children
            .iter()
            .find(|c| c.kind == kind && c.name == name)
    }

    fn child_mut(&mut self, kind: ResourceType, name: &str) -> Option<&mut ConfigNode> {
        self.children
            .iter_mut()
            .find(|c| c.kind == kind && c.name == name)
    }

    fn element(&self) -> PathElement {
        PathElement::new(self.kind.key(), self.name.clone())
    }
}

/// Resolve the resource type of every segment of an address.
pub fn resolve_types(address: &PathAddress) -> Result<Vec<ResourceType>, ModelError> {
    if !address.is_under_subsystem() {
        return Err(ModelError::OutsideSubsystem(address.clone()));
    }
    address
        .elements()
        .iter()
        .map(|e| ResourceType::from_key(&e.key).ok_or_else(|| ModelError::UnknownType(e.key.clone())))
        .collect()
}

/// Resource type addressed by the last segment.
pub fn resource_type(address: &PathAddress) -> Result<ResourceType, ModelError> {
    resolve_types(address)?
        .last()
        .copied()
        .ok_or_else(|| ModelError::OutsideSubsystem(address.clone()))
}

/// The configuration tree rooted at the messaging subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceModel {
    root: ConfigNode,
}

impl Default for ResourceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceModel {
    /// Create a model holding only the subsystem root.
    pub fn new() -> Self {
        Self {
            root: ConfigNode::new(ResourceType::Subsystem, SUBSYSTEM_NAME, BTreeMap::new()),
        }
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Read the node at `address`.
    pub fn read(&self, address: &PathAddress) -> Result<&ConfigNode, ModelError> {
        let types = resolve_types(address)?;
        let mut node = &self.root;
        for (element, kind) in address.elements().iter().zip(types).skip(1) {
            node = node
                .child(kind, &element.value)
                .ok_or_else(|| ModelError::NotFound(address.clone()))?;
        }
        Ok(node)
    }

    fn read_mut(&mut self, address: &PathAddress) -> Result<&mut ConfigNode, ModelError> {
        let types = resolve_types(address)?;
        let mut node = &mut self.root;
        for (element, kind) in address.elements().iter().zip(types).skip(1) {
            node = node
                .child_mut(kind, &element.value)
                .ok_or_else(|| ModelError::NotFound(address.clone()))?;
        }
        Ok(node)
    }

    pub fn contains(&self, address: &PathAddress) -> bool {
        self.read(address).is_ok()
    }

    /// Insert a new node at `address`; the parent must exist.
    pub fn add(
        &mut self,
        address: &PathAddress,
        attributes: BTreeMap<String, Value>,
    ) -> Result<(), ModelError> {
        let kind = resource_type(address)?;
        let parent_address = address
            .parent()
            .ok_or_else(|| ModelError::Duplicate(address.clone()))?;
        let parent = self.read_mut(&parent_address)?;
        if kind.parent() != Some(parent.kind) {
            return Err(ModelError::InvalidChild {
                parent: parent_address,
                child: kind.key().to_string(),
            });
        }
        let name = address.last_value();
        if parent.child(kind, name).is_some() {
            return Err(ModelError::Duplicate(address.clone()));
        }
        parent.children.push(ConfigNode::new(kind, name, attributes));
        Ok(())
    }

    /// Set one attribute and return the previous value.
    pub fn write(
        &mut self,
        address: &PathAddress,
        name: &str,
        value: Value,
    ) -> Result<Option<Value>, ModelError> {
        Ok(self.read_mut(address)?.set_attribute(name, value))
    }

    /// Detach the subtree at `address`.
    pub fn remove(&mut self, address: &PathAddress) -> Result<ConfigNode, ModelError> {
        let kind = resource_type(address)?;
        let parent_address = address
            .parent()
            .ok_or_else(|| ModelError::NotFound(address.clone()))?;
        if parent_address.is_empty() {
            return Err(ModelError::NotFound(address.clone()));
        }
        let parent = self.read_mut(&parent_address)?;
        let name = address.last_value();
        let index = parent
            .children
            .iter()
            .position(|c| c.kind == kind && c.name == name)
            .ok_or_else(|| ModelError::NotFound(address.clone()))?;
        Ok(parent.children.remove(index))
    }

    /// Addresses of every node in the subtree at `address`, parents first.
    pub fn addresses_under(&self, address: &PathAddress) -> Result<Vec<PathAddress>, ModelError> {
        fn walk(node: &ConfigNode, at: PathAddress, out: &mut Vec<PathAddress>) {
            for child in &node.children {
                let element = child.element();
                let child_address = at.append(element.key, element.value);
                out.push(child_address.clone());
                walk(child, child_address, out);
            }
        }

        let node = self.read(address)?;
        let mut out = Vec::new();
        walk(node, address.clone(), &mut out);
        Ok(out)
    }

    /// Names of the configured servers in declaration order.
    pub fn server_names(&self) -> Vec<String> {
        self.root
            .children_of(ResourceType::Server)
            .map(|s| s.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> BTreeMap<String, Value> {
        value
            .as_object()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn model_with_server() -> ResourceModel {
        let mut model = ResourceModel::new();
        model
            .add(&PathAddress::server("default"), BTreeMap::new())
            .expect("add server");
        model
    }

    #[test]
    fn test_add_read_remove() {
        let mut model = model_with_server();
        let queue = PathAddress::server("default").append("queue", "q1");
        model
            .add(&queue, attrs(json!({"queue-address": "q1"})))
            .expect("add queue");

        let node = model.read(&queue).expect("read");
        assert_eq!(node.kind(), ResourceType::Queue);
        assert_eq!(node.attribute("queue-address"), Some(&json!("q1")));

        let removed = model.remove(&queue).expect("remove");
        assert_eq!(removed.name(), "q1");
        assert_eq!(model.read(&queue), Err(ModelError::NotFound(queue)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut model = model_with_server();
        let err = model
            .add(&PathAddress::server("default"), BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, ModelError::Duplicate(_)));
    }

    #[test]
    fn test_missing_parent() {
        let mut model = ResourceModel::new();
        let queue = PathAddress::server("nope").append("queue", "q1");
        assert!(matches!(
            model.add(&queue, BTreeMap::new()),
            Err(ModelError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_child() {
        let mut model = model_with_server();
        let role = PathAddress::server("default").append("role", "admin");
        assert!(matches!(
            model.add(&role, BTreeMap::new()),
            Err(ModelError::InvalidChild { .. })
        ));
    }

    #[test]
    fn test_unknown_type() {
        let model = ResourceModel::new();
        let addr = PathAddress::server("default").append("topic", "t");
        assert!(matches!(model.read(&addr), Err(ModelError::UnknownType(_))));
    }

    #[test]
    fn test_insertion_order_and_walk() {
        let mut model = model_with_server();
        let server = PathAddress::server("default");
        for name in ["c", "a", "b"] {
            model
                .add(&server.append("divert", name), BTreeMap::new())
                .expect("add");
        }
        let names: Vec<_> = model
            .read(&server)
            .expect("server")
            .children_of(ResourceType::Divert)
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let all = model.addresses_under(&PathAddress::subsystem()).expect("walk");
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], server);
    }

    #[test]
    fn test_write_and_undefine() {
        let mut model = model_with_server();
        let server = PathAddress::server("default");
        let old = model
            .write(&server, "statistics-enabled", json!(true))
            .expect("write");
        assert_eq!(old, None);
        let node = model.read(&server).expect("read");
        assert_eq!(node.attribute_or_default("statistics-enabled"), Some(json!(true)));

        model
            .write(&server, "statistics-enabled", Value::Null)
            .expect("undefine");
        let node = model.read(&server).expect("read");
        assert_eq!(node.attribute("statistics-enabled"), None);
        assert_eq!(node.attribute_or_default("statistics-enabled"), Some(json!(false)));
    }
}
