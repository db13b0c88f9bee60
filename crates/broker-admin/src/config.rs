// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subsystem configuration.
//!
//! Supports both programmatic and file-based configuration.

use crate::model::PathAddress;
use crate::operation::op::Operation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Subsystem name (for identification).
    #[serde(default = "default_name")]
    pub name: String,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Servers whose broker starts as a passive backup.
    #[serde(default)]
    pub backup_servers: Vec<String>,

    /// Values for `${name}` expressions.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Resources added at boot, in declaration order.
    #[serde(default)]
    pub boot: Vec<BootEntry>,
}

fn default_name() -> String {
    "messaging-activemq".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            backup_servers: Vec::new(),
            properties: BTreeMap::new(),
            boot: Vec::new(),
        }
    }
}

impl AdminConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration declaring a single empty server.
    pub fn with_server(name: &str) -> Self {
        let mut config = Self::default();
        config.add_boot(BootEntry::new(PathAddress::server(name).to_string()));
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("Subsystem name is empty".into()));
        }

        let mut seen = BTreeSet::new();
        for (i, entry) in self.boot.iter().enumerate() {
            let address = entry.parse_address().map_err(|e| {
                ConfigError::Invalid(format!("Boot entry {} has a bad address: {}", i, e))
            })?;
            if !address.is_under_subsystem() || address.len() < 2 {
                return Err(ConfigError::Invalid(format!(
                    "Boot entry {} ({}) is not a resource of the messaging subsystem",
                    i, address
                )));
            }
            if !seen.insert(address.to_string()) {
                return Err(ConfigError::Invalid(format!(
                    "Boot entry {} duplicates {}",
                    i, address
                )));
            }
        }

        Ok(())
    }

    /// Add a boot entry.
    pub fn add_boot(&mut self, entry: BootEntry) {
        self.boot.push(entry);
    }

    /// The boot entries as `add` operations.
    pub fn boot_operations(&self) -> Result<Vec<Operation>, ConfigError> {
        self.boot
            .iter()
            .map(|entry| {
                let address = entry
                    .parse_address()
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                Ok(Operation::add(address, Value::Object(entry.params.clone())))
            })
            .collect()
    }
}

/// One resource added at boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootEntry {
    /// Resource address, e.g. `/subsystem=messaging-activemq/server=default`.
    pub address: String,

    /// Attributes of the `add` operation.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl BootEntry {
    /// Create a new entry without attributes.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            params: Map::new(),
        }
    }

    /// Set an attribute.
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    fn parse_address(&self) -> Result<PathAddress, crate::model::address::AddressError> {
        self.address.parse()
    }
}

/// Load a JSON array of operations.
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<Operation>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: AdminConfig = toml::from_str("").expect("parse");
        assert_eq!(config.name, "messaging-activemq");
        assert_eq!(config.log_level, "info");
        assert!(config.boot.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"
backup_servers = ["backup"]

[properties]
"queue.name" = "orders"

[[boot]]
address = "/subsystem=messaging-activemq/server=default"
params = {{ statistics-enabled = true }}

[[boot]]
address = "/subsystem=messaging-activemq/server=default/queue=orders"
params = {{ queue-address = "${{queue.name}}" }}
"#
        )
        .expect("write");

        let config = AdminConfig::from_file(file.path()).expect("load");
        assert_eq!(config.backup_servers, vec!["backup".to_string()]);
        assert_eq!(config.properties.get("queue.name").map(String::as_str), Some("orders"));

        let ops = config.boot_operations().expect("operations");
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].address, PathAddress::server("default"));
        assert_eq!(ops[0].param("statistics-enabled"), Some(&Value::Bool(true)));
        assert_eq!(
            ops[1].param("queue-address"),
            Some(&Value::String("${queue.name}".into()))
        );
    }

    #[test]
    fn test_validation() {
        let mut config = AdminConfig::with_server("default");
        assert!(config.validate().is_ok());

        config.add_boot(BootEntry::new(PathAddress::server("default").to_string()));
        assert!(config.validate().is_err()); // Duplicate

        config.boot.truncate(1);
        config.add_boot(BootEntry::new("/subsystem=logging/logger=x"));
        assert!(config.validate().is_err()); // Other subsystem

        config.boot.truncate(1);
        config.add_boot(BootEntry::new("server"));
        assert!(config.validate().is_err()); // Malformed

        config.boot.truncate(1);
        config.name = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AdminConfig::from_file("/nonexistent/broker-admin.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_load_script() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[
  {{"operation": "add", "address": "/subsystem=messaging-activemq/server=default"}},
  {{"operation": "read-attribute", "address": "/subsystem=messaging-activemq/server=default", "name": "started"}}
]"#
        )
        .expect("write");

        let ops = load_script(file.path()).expect("script");
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].param_str("name").expect("name"), "started");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AdminConfig::with_server("default");
        config.add_boot(
            BootEntry::new(PathAddress::server("default").append("queue", "q").to_string())
                .param("durable", true),
        );
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        assert!(toml_str.contains("[[boot]]"));
        let parsed: AdminConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed.boot.len(), 2);
    }
}
