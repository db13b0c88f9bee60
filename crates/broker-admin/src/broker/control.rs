// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Control surface of one running broker.

use crate::broker::configuration::{
    AddressSettings, BridgeConfiguration, BrokerConfiguration, DivertConfiguration,
    QueueConfiguration, Role, TransportConfiguration,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by broker control calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("Broker is not started")]
    NotStarted,

    #[error("{0}")]
    Failed(String),
}

impl ControlError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }
}

/// Live status of a broker queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub name: String,
    pub address: String,
    pub routing_type: String,
    pub filter: Option<String>,
    pub durable: bool,
    pub temporary: bool,
    pub paused: bool,
    pub message_count: i64,
    pub delivering_count: i32,
    pub messages_added: i64,
    pub consumer_count: i32,
    pub scheduled_count: i64,
}

/// Handle to one running broker instance.
///
/// Mutating calls are only meaningful while the broker is started and
/// active; callers go through the lifecycle gate first.
pub trait BrokerControl: Send + Sync {
    fn name(&self) -> &str;

    fn is_started(&self) -> bool;

    /// False while the broker runs as a passive backup.
    fn is_active(&self) -> bool;

    fn version(&self) -> String;

    fn journal_type(&self) -> String;

    fn create_divert(&self, divert: &DivertConfiguration) -> Result<(), ControlError>;

    fn destroy_divert(&self, name: &str) -> Result<(), ControlError>;

    fn deploy_bridge(&self, bridge: &BridgeConfiguration) -> Result<(), ControlError>;

    fn destroy_bridge(&self, name: &str) -> Result<(), ControlError>;

    fn deploy_queue(&self, queue: &QueueConfiguration) -> Result<(), ControlError>;

    fn destroy_queue(&self, name: &str) -> Result<(), ControlError>;

    fn message_counter_sample_period(&self) -> i64;

    fn set_message_counter_sample_period(&self, period: i64) -> Result<(), ControlError>;

    fn message_counter_max_day_count(&self) -> i32;

    fn set_message_counter_max_day_count(&self, count: i32) -> Result<(), ControlError>;

    fn is_message_counter_enabled(&self) -> bool;

    fn enable_message_counters(&self) -> Result<(), ControlError>;

    fn disable_message_counters(&self) -> Result<(), ControlError>;

    fn reset_all_message_counters(&self) -> Result<(), ControlError>;

    fn reset_all_message_counter_histories(&self) -> Result<(), ControlError>;

    /// Settings repository entry registered for exactly `pattern`.
    fn address_settings_match(&self, pattern: &str) -> Option<AddressSettings>;

    /// Replace the whole settings entry for `pattern`.
    fn add_address_settings_match(
        &self,
        pattern: &str,
        settings: AddressSettings,
    ) -> Result<(), ControlError>;

    fn remove_address_settings_match(&self, pattern: &str) -> Result<(), ControlError>;

    /// Security repository role set registered for exactly `pattern`.
    fn security_match(&self, pattern: &str) -> Option<BTreeSet<Role>>;

    /// Replace the whole role set for `pattern`.
    fn add_security_match(&self, pattern: &str, roles: BTreeSet<Role>) -> Result<(), ControlError>;

    fn remove_security_match(&self, pattern: &str) -> Result<(), ControlError>;

    fn list_connection_ids(&self) -> Vec<String>;

    fn connectors(&self) -> Vec<TransportConfiguration>;

    fn queue_names(&self) -> Vec<String>;

    fn queue(&self, name: &str) -> Option<QueueStatus>;

    fn pause_queue(&self, name: &str) -> Result<(), ControlError>;

    fn resume_queue(&self, name: &str) -> Result<(), ControlError>;

    fn count_messages(&self, name: &str, filter: Option<&str>) -> Result<i64, ControlError>;

    fn reset_message_counter(&self, name: &str) -> Result<(), ControlError>;

    /// Stop this live broker so that its backup takes over.
    fn force_failover(&self) -> Result<(), ControlError>;

    fn start(&self) -> Result<(), ControlError>;

    fn stop(&self) -> Result<(), ControlError>;
}

/// Creates brokers from a complete configuration, once per broker start.
pub trait BrokerFactory: Send + Sync {
    fn create(
        &self,
        configuration: BrokerConfiguration,
        backup: bool,
    ) -> Result<Arc<dyn BrokerControl>, ControlError>;
}
