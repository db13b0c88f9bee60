// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resource-tree addresses.
//!
//! An address is a path of `(key, value)` segments from the subsystem root,
//! written as `/subsystem=messaging-activemq/server=default/queue=q1`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key of the root segment of every managed address.
pub const SUBSYSTEM: &str = "subsystem";

/// Name of the subsystem root.
pub const SUBSYSTEM_NAME: &str = "messaging-activemq";

/// Address parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Malformed address segment '{0}' (expected key=value)")]
    MalformedSegment(String),

    #[error("Empty address")]
    Empty,
}

/// One `key=value` segment of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Address of a resource in the management tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PathAddress {
    elements: Vec<PathElement>,
}

impl PathAddress {
    /// The empty address.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Address of the subsystem root.
    pub fn subsystem() -> Self {
        Self {
            elements: vec![PathElement::new(SUBSYSTEM, SUBSYSTEM_NAME)],
        }
    }

    /// Address of a server below the subsystem root.
    pub fn server(name: &str) -> Self {
        Self::subsystem().append("server", name)
    }

    /// Build from raw elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Return a new address with one more segment.
    pub fn append(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(PathElement::new(key, value));
        Self { elements }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Name of the last segment, or the empty string for the empty address.
    pub fn last_value(&self) -> &str {
        self.elements.last().map(|e| e.value.as_str()).unwrap_or("")
    }

    /// Parent address (the empty address has no parent).
    pub fn parent(&self) -> Option<Self> {
        if self.elements.is_empty() {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    /// Replace the last segment, keeping the parent.
    pub fn sibling(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self.parent() {
            Some(parent) => parent.append(key, value),
            None => Self::empty().append(key, value),
        }
    }

    /// Whether this address lies under the subsystem root (or is the root).
    pub fn is_under_subsystem(&self) -> bool {
        self.elements
            .first()
            .map(|e| e.key == SUBSYSTEM && e.value == SUBSYSTEM_NAME)
            .unwrap_or(false)
    }

    /// Value of the first segment with the given key.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return write!(f, "/");
        }
        for element in &self.elements {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let mut elements = Vec::new();
        for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| AddressError::MalformedSegment(segment.to_string()))?;
            if key.is_empty() || value.is_empty() {
                return Err(AddressError::MalformedSegment(segment.to_string()));
            }
            elements.push(PathElement::new(key, value));
        }

        Ok(Self { elements })
    }
}

impl Serialize for PathAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PathAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
