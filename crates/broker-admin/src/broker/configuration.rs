// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broker configuration objects built from the model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Acceptor or connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfiguration {
    pub name: String,
    /// `remote`, `http`, `in-vm`, or a factory class for generic transports.
    pub factory: String,
    pub params: BTreeMap<String, String>,
}

/// Broadcast or discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupEndpoint {
    Socket { socket_binding: String },
    JGroups {
        cluster: String,
        channel: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastGroupConfiguration {
    pub name: String,
    pub endpoint: GroupEndpoint,
    pub broadcast_period: i64,
    pub connectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryGroupConfiguration {
    pub name: String,
    pub endpoint: GroupEndpoint,
    pub refresh_timeout: i64,
    pub initial_wait_timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConnectionConfiguration {
    pub name: String,
    pub address: String,
    pub connector_name: String,
    pub static_connectors: Vec<String>,
    pub discovery_group: Option<String>,
    pub allow_direct_connections_only: bool,
    pub retry_interval: i64,
    pub use_duplicate_detection: bool,
    pub message_load_balancing_type: String,
    pub max_hops: i32,
    pub call_timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfiguration {
    pub name: String,
    pub queue_name: String,
    pub forwarding_address: Option<String>,
    pub filter: Option<String>,
    pub static_connectors: Vec<String>,
    pub discovery_group: Option<String>,
    pub ha: bool,
    pub retry_interval: i64,
    pub reconnect_attempts: i32,
    pub use_duplicate_detection: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub transformer_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivertConfiguration {
    pub name: String,
    pub address: String,
    pub forwarding_address: String,
    pub filter: Option<String>,
    pub exclusive: bool,
    pub routing_name: String,
    pub routing_type: String,
    pub transformer_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfiguration {
    pub name: String,
    pub address: String,
    pub filter: Option<String>,
    pub durable: bool,
    pub routing_type: String,
}

/// One settings-repository entry. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSettings {
    pub dead_letter_address: Option<String>,
    pub expiry_address: Option<String>,
    pub expiry_delay: i64,
    pub redelivery_delay: i64,
    pub max_delivery_attempts: i32,
    pub max_size_bytes: i64,
    pub page_size_bytes: i64,
    pub address_full_policy: String,
    pub message_counter_history_day_limit: i32,
    pub redistribution_delay: i64,
    pub send_to_dla_on_no_route: bool,
    pub last_value_queue: bool,
    pub auto_create_queues: bool,
    pub auto_delete_queues: bool,
    pub auto_create_addresses: bool,
}

/// Security role with its permissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub send: bool,
    pub consume: bool,
    pub create_durable_queue: bool,
    pub delete_durable_queue: bool,
    pub create_non_durable_queue: bool,
    pub delete_non_durable_queue: bool,
    pub manage: bool,
    pub browse: bool,
    pub create_address: bool,
    pub delete_address: bool,
}

impl Role {
    /// Role without any permission.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            send: false,
            consume: false,
            create_durable_queue: false,
            delete_durable_queue: false,
            create_non_durable_queue: false,
            delete_non_durable_queue: false,
            manage: false,
            browse: false,
            create_address: false,
            delete_address: false,
        }
    }

    /// Set a permission by its attribute name. Unknown names are ignored.
    pub fn set_permission(&mut self, permission: &str, value: bool) {
        let slot = match permission {
            "send" => &mut self.send,
            "consume" => &mut self.consume,
            "create-durable-queue" => &mut self.create_durable_queue,
            "delete-durable-queue" => &mut self.delete_durable_queue,
            "create-non-durable-queue" => &mut self.create_non_durable_queue,
            "delete-non-durable-queue" => &mut self.delete_non_durable_queue,
            "manage" => &mut self.manage,
            "browse" => &mut self.browse,
            "create-address" => &mut self.create_address,
            "delete-address" => &mut self.delete_address,
            _ => return,
        };
        *slot = value;
    }
}

/// Replace the role named `role.name` in `roles`.
pub fn replace_role(roles: &mut BTreeSet<Role>, role: Role) {
    roles.retain(|r| r.name != role.name);
    roles.insert(role);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorServiceConfiguration {
    pub name: String,
    pub factory_class: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingHandlerConfiguration {
    pub name: String,
    pub kind: String,
    pub address: String,
    pub timeout: i64,
    pub group_timeout: i64,
    pub reaper_period: i64,
}

/// Complete configuration of one broker, handed over at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfiguration {
    pub name: String,
    pub persistence_enabled: bool,
    pub security_enabled: bool,
    pub security_domain: Option<String>,
    pub cluster_user: String,
    pub cluster_password: String,
    pub journal_type: String,
    pub journal_file_size: i64,
    pub transaction_timeout: i64,
    pub id_cache_size: i32,
    pub management_address: String,
    pub jmx_management_enabled: bool,
    pub wild_card_routing_enabled: bool,
    pub message_counter_enabled: bool,
    pub message_counter_sample_period: i64,
    pub message_counter_max_day_history: i32,
    pub acceptors: Vec<TransportConfiguration>,
    pub connectors: Vec<TransportConfiguration>,
    pub broadcast_groups: Vec<BroadcastGroupConfiguration>,
    pub discovery_groups: Vec<DiscoveryGroupConfiguration>,
    pub cluster_connections: Vec<ClusterConnectionConfiguration>,
    pub bridges: Vec<BridgeConfiguration>,
    pub diverts: Vec<DivertConfiguration>,
    pub queues: Vec<QueueConfiguration>,
    pub address_settings: Vec<(String, AddressSettings)>,
    pub security_settings: Vec<(String, BTreeSet<Role>)>,
    pub connector_services: Vec<ConnectorServiceConfiguration>,
    pub grouping_handler: Option<GroupingHandlerConfiguration>,
}

impl BrokerConfiguration {
    /// Configuration with the broker defaults and no children.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistence_enabled: true,
            security_enabled: true,
            security_domain: None,
            cluster_user: "ACTIVEMQ.CLUSTER.ADMIN.USER".to_string(),
            cluster_password: "CHANGE ME!!".to_string(),
            journal_type: "ASYNCIO".to_string(),
            journal_file_size: 10_485_760,
            transaction_timeout: 300_000,
            id_cache_size: 20_000,
            management_address: "activemq.management".to_string(),
            jmx_management_enabled: false,
            wild_card_routing_enabled: true,
            message_counter_enabled: false,
            message_counter_sample_period: 10_000,
            message_counter_max_day_history: 10,
            acceptors: Vec::new(),
            connectors: Vec::new(),
            broadcast_groups: Vec::new(),
            discovery_groups: Vec::new(),
            cluster_connections: Vec::new(),
            bridges: Vec::new(),
            diverts: Vec::new(),
            queues: Vec::new(),
            address_settings: Vec::new(),
            security_settings: Vec::new(),
            connector_services: Vec::new(),
            grouping_handler: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        let mut role = Role::named("admin");
        role.set_permission("manage", true);
        role.set_permission("create-address", true);
        role.set_permission("unknown", true);
        assert!(role.manage);
        assert!(role.create_address);
        assert!(!role.send);
    }

    #[test]
    fn test_replace_role_by_name() {
        let mut roles = BTreeSet::new();
        roles.insert(Role::named("guest"));
        let mut updated = Role::named("guest");
        updated.send = true;
        replace_role(&mut roles, updated.clone());
        assert_eq!(roles.len(), 1);
        assert!(roles.contains(&updated));
    }

    #[test]
    fn test_endpoint_json_shape() {
        let endpoint = GroupEndpoint::JGroups {
            cluster: "activemq-cluster".into(),
            channel: None,
        };
        let json = serde_json::to_value(&endpoint).expect("serialize");
        assert_eq!(json["jgroups"]["cluster"], "activemq-cluster");
    }
}
