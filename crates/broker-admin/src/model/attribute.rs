// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static attribute descriptors.

use crate::model::corrector::correct_address;
use serde_json::Value;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Int,
    Long,
    Boolean,
    /// List of strings.
    StringList,
    /// String to string map.
    Properties,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Boolean => "BOOLEAN",
            Self::StringList => "LIST",
            Self::Properties => "OBJECT",
        }
    }
}

/// What a change to the attribute needs before it takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartFlag {
    /// Applied to the running broker through a mutator.
    None,
    /// Needs the broker (and all its services) to restart.
    AllServices,
}

/// Where the attribute value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Persisted in the configuration model.
    Configuration,
    /// Computed from the running broker, read-only.
    Runtime,
}

/// Default value of an attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::from(i),
            Self::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// Normalization applied to a value before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corrector {
    /// Canonical broker address, see [`correct_address`].
    Address,
}

impl Corrector {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Address => correct_address(value),
        }
    }
}

/// Descriptor of one attribute of a resource type.
#[derive(Debug, Clone, Copy)]
pub struct AttributeDefinition {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub allow_expression: bool,
    pub restart: RestartFlag,
    pub storage: Storage,
    /// Attributes that must not be defined together with this one.
    pub alternatives: &'static [&'static str],
    pub allowed: &'static [&'static str],
    pub range: Option<(i64, i64)>,
    pub corrector: Option<Corrector>,
}

impl AttributeDefinition {
    const fn base(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            allow_expression: true,
            restart: RestartFlag::AllServices,
            storage: Storage::Configuration,
            alternatives: &[],
            allowed: &[],
            range: None,
            corrector: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self::base(name, AttributeKind::String)
    }

    pub const fn int(name: &'static str) -> Self {
        Self::base(name, AttributeKind::Int)
    }

    pub const fn long(name: &'static str) -> Self {
        Self::base(name, AttributeKind::Long)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::base(name, AttributeKind::Boolean)
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            allow_expression: false,
            ..Self::base(name, AttributeKind::StringList)
        }
    }

    pub const fn properties(name: &'static str) -> Self {
        Self {
            allow_expression: false,
            ..Self::base(name, AttributeKind::Properties)
        }
    }

    /// Read-only metric or status computed by the broker.
    pub const fn runtime(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            storage: Storage::Runtime,
            restart: RestartFlag::None,
            allow_expression: false,
            ..Self::base(name, kind)
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn default_bool(self, value: bool) -> Self {
        Self {
            default: Some(DefaultValue::Bool(value)),
            ..self
        }
    }

    pub const fn default_int(self, value: i64) -> Self {
        Self {
            default: Some(DefaultValue::Int(value)),
            ..self
        }
    }

    pub const fn default_str(self, value: &'static str) -> Self {
        Self {
            default: Some(DefaultValue::Str(value)),
            ..self
        }
    }

    /// Mark the attribute as applicable to the running broker.
    pub const fn live(self) -> Self {
        Self {
            restart: RestartFlag::None,
            ..self
        }
    }

    pub const fn alternatives(self, alternatives: &'static [&'static str]) -> Self {
        Self {
            alternatives,
            ..self
        }
    }

    pub const fn allowed(self, allowed: &'static [&'static str]) -> Self {
        Self { allowed, ..self }
    }

    pub const fn range(self, min: i64, max: i64) -> Self {
        Self {
            range: Some((min, max)),
            ..self
        }
    }

    pub const fn corrected(self, corrector: Corrector) -> Self {
        Self {
            corrector: Some(corrector),
            ..self
        }
    }

    pub fn is_runtime(&self) -> bool {
        self.storage == Storage::Runtime
    }

    /// Configuration attribute applied without a restart.
    pub fn is_live(&self) -> bool {
        self.storage == Storage::Configuration && self.restart == RestartFlag::None
    }

    pub fn requires_restart(&self) -> bool {
        self.restart != RestartFlag::None
    }

    pub fn default_value(&self) -> Option<Value> {
        self.default.map(DefaultValue::to_value)
    }
}
