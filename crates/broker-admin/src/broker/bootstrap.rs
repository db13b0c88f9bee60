// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Building broker configuration objects from model nodes.
//!
//! The same builders serve the bulk bootstrap and the live add/remove
//! handlers, so a resource deployed live and one consumed at boot end up
//! identical on the broker.

use crate::broker::configuration::{
    AddressSettings, BridgeConfiguration, BroadcastGroupConfiguration, BrokerConfiguration,
    ClusterConnectionConfiguration, ConnectorServiceConfiguration, DiscoveryGroupConfiguration,
    DivertConfiguration, GroupEndpoint, GroupingHandlerConfiguration, QueueConfiguration, Role,
    TransportConfiguration,
};
use crate::model::descriptor::{ResourceType, ROLE_PERMISSIONS};
use crate::model::node::{ConfigNode, ModelError, ResourceModel};
use crate::model::validate::{resolved_attribute, ValidationError};
use crate::model::{ExpressionResolver, PathAddress};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Typed attribute access on one node.
pub struct NodeReader<'a> {
    node: &'a ConfigNode,
    resolver: &'a ExpressionResolver,
}

impl<'a> NodeReader<'a> {
    pub fn new(node: &'a ConfigNode, resolver: &'a ExpressionResolver) -> Self {
        Self { node, resolver }
    }

    pub fn value(&self, name: &str) -> Result<Value, ValidationError> {
        resolved_attribute(
            self.node.kind().descriptor(),
            self.node.attributes(),
            name,
            self.resolver,
        )
    }

    pub fn opt_string(&self, name: &str) -> Result<Option<String>, ValidationError> {
        Ok(match self.value(name)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn string(&self, name: &str) -> Result<String, ValidationError> {
        self.opt_string(name)?
            .ok_or_else(|| ValidationError::MissingRequired(name.to_string()))
    }

    pub fn long(&self, name: &str) -> Result<i64, ValidationError> {
        self.value(name)?
            .as_i64()
            .ok_or_else(|| ValidationError::MissingRequired(name.to_string()))
    }

    pub fn int(&self, name: &str) -> Result<i32, ValidationError> {
        let value = self.long(name)?;
        i32::try_from(value).map_err(|_| ValidationError::OutOfRange {
            attribute: name.to_string(),
            value,
            min: i32::MIN as i64,
            max: i32::MAX as i64,
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ValidationError> {
        Ok(self.value(name)?.as_bool().unwrap_or(false))
    }

    pub fn list(&self, name: &str) -> Result<Vec<String>, ValidationError> {
        Ok(match self.value(name)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn properties(&self, name: &str) -> Result<BTreeMap<String, String>, ValidationError> {
        Ok(match self.value(name)? {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
            _ => BTreeMap::new(),
        })
    }
}

fn transport_factory(kind: ResourceType, reader: &NodeReader<'_>) -> Result<String, ValidationError> {
    Ok(match kind {
        ResourceType::RemoteAcceptor | ResourceType::RemoteConnector => "remote".to_string(),
        ResourceType::HttpAcceptor | ResourceType::HttpConnector => "http".to_string(),
        ResourceType::InVmAcceptor | ResourceType::InVmConnector => "in-vm".to_string(),
        _ => reader.string("factory-class")?,
    })
}

/// Acceptor or connector of any transport kind.
pub fn transport(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<TransportConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    let mut params = reader.properties("params")?;
    for name in [
        "socket-binding",
        "http-listener",
        "server-id",
        "endpoint",
        "server-name",
        "upgrade-legacy",
    ] {
        if node.kind().descriptor().attribute(name).is_none() {
            continue;
        }
        match reader.value(name)? {
            Value::Null => {}
            Value::String(s) => {
                params.insert(name.to_string(), s);
            }
            other => {
                params.insert(name.to_string(), other.to_string());
            }
        }
    }
    Ok(TransportConfiguration {
        name: node.name().to_string(),
        factory: transport_factory(node.kind(), &reader)?,
        params,
    })
}

fn group_endpoint(reader: &NodeReader<'_>, jgroups: bool) -> Result<GroupEndpoint, ValidationError> {
    if jgroups {
        Ok(GroupEndpoint::JGroups {
            cluster: reader.string("jgroups-cluster")?,
            channel: reader.opt_string("jgroups-channel")?,
        })
    } else {
        Ok(GroupEndpoint::Socket {
            socket_binding: reader.string("socket-binding")?,
        })
    }
}

pub fn broadcast_group(
    node: &ConfigNode,
    resolver: &ExpressionResolver,
) -> Result<BroadcastGroupConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(BroadcastGroupConfiguration {
        name: node.name().to_string(),
        endpoint: group_endpoint(&reader, node.kind() == ResourceType::JGroupsBroadcastGroup)?,
        broadcast_period: reader.long("broadcast-period")?,
        connectors: reader.list("connectors")?,
    })
}

pub fn discovery_group(
    node: &ConfigNode,
    resolver: &ExpressionResolver,
) -> Result<DiscoveryGroupConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(DiscoveryGroupConfiguration {
        name: node.name().to_string(),
        endpoint: group_endpoint(&reader, node.kind() == ResourceType::JGroupsDiscoveryGroup)?,
        refresh_timeout: reader.long("refresh-timeout")?,
        initial_wait_timeout: reader.long("initial-wait-timeout")?,
    })
}

pub fn cluster_connection(
    node: &ConfigNode,
    resolver: &ExpressionResolver,
) -> Result<ClusterConnectionConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(ClusterConnectionConfiguration {
        name: node.name().to_string(),
        address: reader.string("cluster-connection-address")?,
        connector_name: reader.string("connector-name")?,
        static_connectors: reader.list("static-connectors")?,
        discovery_group: reader.opt_string("discovery-group")?,
        allow_direct_connections_only: reader.boolean("allow-direct-connections-only")?,
        retry_interval: reader.long("retry-interval")?,
        use_duplicate_detection: reader.boolean("use-duplicate-detection")?,
        message_load_balancing_type: reader.string("message-load-balancing-type")?,
        max_hops: reader.int("max-hops")?,
        call_timeout: reader.long("call-timeout")?,
    })
}

pub fn bridge(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<BridgeConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(BridgeConfiguration {
        name: node.name().to_string(),
        queue_name: reader.string("queue-name")?,
        forwarding_address: reader.opt_string("forwarding-address")?,
        filter: reader.opt_string("filter")?,
        static_connectors: reader.list("static-connectors")?,
        discovery_group: reader.opt_string("discovery-group")?,
        ha: reader.boolean("ha")?,
        retry_interval: reader.long("retry-interval")?,
        reconnect_attempts: reader.int("reconnect-attempts")?,
        use_duplicate_detection: reader.boolean("use-duplicate-detection")?,
        user: reader.opt_string("user")?,
        password: reader.opt_string("password")?,
        transformer_class_name: reader.opt_string("transformer-class-name")?,
    })
}

pub fn divert(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<DivertConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(DivertConfiguration {
        name: node.name().to_string(),
        address: reader.string("divert-address")?,
        forwarding_address: reader.string("forwarding-address")?,
        filter: reader.opt_string("filter")?,
        exclusive: reader.boolean("exclusive")?,
        routing_name: reader
            .opt_string("routing-name")?
            .unwrap_or_else(|| node.name().to_string()),
        routing_type: reader.string("routing-type")?,
        transformer_class_name: reader.opt_string("transformer-class-name")?,
    })
}

/// Core queue or JMS queue. A JMS queue is an anycast queue whose address
/// is its own name.
pub fn queue(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<QueueConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    if node.kind() == ResourceType::JmsQueue {
        return Ok(QueueConfiguration {
            name: node.name().to_string(),
            address: node.name().to_string(),
            filter: reader.opt_string("selector")?,
            durable: reader.boolean("durable")?,
            routing_type: "ANYCAST".to_string(),
        });
    }
    Ok(QueueConfiguration {
        name: node.name().to_string(),
        address: reader.string("queue-address")?,
        filter: reader.opt_string("filter")?,
        durable: reader.boolean("durable")?,
        routing_type: reader.string("routing-type")?,
    })
}

pub fn address_settings(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<AddressSettings, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(AddressSettings {
        dead_letter_address: reader.opt_string("dead-letter-address")?,
        expiry_address: reader.opt_string("expiry-address")?,
        expiry_delay: reader.long("expiry-delay")?,
        redelivery_delay: reader.long("redelivery-delay")?,
        max_delivery_attempts: reader.int("max-delivery-attempts")?,
        max_size_bytes: reader.long("max-size-bytes")?,
        page_size_bytes: reader.long("page-size-bytes")?,
        address_full_policy: reader.string("address-full-policy")?,
        message_counter_history_day_limit: reader.int("message-counter-history-day-limit")?,
        redistribution_delay: reader.long("redistribution-delay")?,
        send_to_dla_on_no_route: reader.boolean("send-to-dla-on-no-route")?,
        last_value_queue: reader.boolean("last-value-queue")?,
        auto_create_queues: reader.boolean("auto-create-queues")?,
        auto_delete_queues: reader.boolean("auto-delete-queues")?,
        auto_create_addresses: reader.boolean("auto-create-addresses")?,
    })
}

pub fn role(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<Role, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    let mut role = Role::named(node.name());
    for permission in ROLE_PERMISSIONS {
        role.set_permission(permission, reader.boolean(permission)?);
    }
    Ok(role)
}

/// Role set of a security-setting node.
pub fn roles(node: &ConfigNode, resolver: &ExpressionResolver) -> Result<BTreeSet<Role>, ValidationError> {
    node.children_of(ResourceType::Role)
        .map(|r| role(r, resolver))
        .collect()
}

pub fn connector_service(
    node: &ConfigNode,
    resolver: &ExpressionResolver,
) -> Result<ConnectorServiceConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(ConnectorServiceConfiguration {
        name: node.name().to_string(),
        factory_class: reader.string("factory-class")?,
        params: reader.properties("params")?,
    })
}

pub fn grouping_handler(
    node: &ConfigNode,
    resolver: &ExpressionResolver,
) -> Result<GroupingHandlerConfiguration, ValidationError> {
    let reader = NodeReader::new(node, resolver);
    Ok(GroupingHandlerConfiguration {
        name: node.name().to_string(),
        kind: reader.string("type")?,
        address: reader.string("grouping-handler-address")?,
        timeout: reader.long("timeout")?,
        group_timeout: reader.long("group-timeout")?,
        reaper_period: reader.long("reaper-period")?,
    })
}

/// Configuration entries of one server, accumulated in the model before
/// its broker exists.
///
/// Consumed by value, once, when the broker is created.
#[derive(Debug)]
pub struct PendingConfigQueue {
    server: ConfigNode,
}

impl PendingConfigQueue {
    /// Capture the server subtree at `server`.
    pub fn collect(model: &ResourceModel, server: &PathAddress) -> Result<Self, ModelError> {
        Ok(Self {
            server: model.read(server)?.clone(),
        })
    }

    pub fn server_name(&self) -> &str {
        self.server.name()
    }

    /// Number of pending child entries.
    pub fn len(&self) -> usize {
        self.server.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.server.children().is_empty()
    }

    /// Build the complete broker configuration, children in declaration order.
    pub fn into_configuration(
        self,
        resolver: &ExpressionResolver,
    ) -> Result<BrokerConfiguration, ValidationError> {
        let server = &self.server;
        let reader = NodeReader::new(server, resolver);
        let mut config = BrokerConfiguration::named(server.name());

        config.persistence_enabled = reader.boolean("persistence-enabled")?;
        config.security_enabled = reader.boolean("security-enabled")?;
        config.security_domain = match reader.opt_string("elytron-domain")? {
            Some(domain) => Some(domain),
            None => reader.opt_string("security-domain")?,
        };
        config.cluster_user = reader.string("cluster-user")?;
        config.cluster_password = reader.string("cluster-password")?;
        config.journal_type = reader.string("journal-type")?;
        config.journal_file_size = reader.long("journal-file-size")?;
        config.transaction_timeout = reader.long("transaction-timeout")?;
        config.id_cache_size = reader.int("id-cache-size")?;
        config.management_address = reader.string("management-address")?;
        config.jmx_management_enabled = reader.boolean("jmx-management-enabled")?;
        config.wild_card_routing_enabled = reader.boolean("wild-card-routing-enabled")?;
        config.message_counter_enabled = reader.boolean("statistics-enabled")?;
        config.message_counter_sample_period = reader.long("message-counter-sample-period")?;
        config.message_counter_max_day_history = reader.int("message-counter-max-day-history")?;

        for child in server.children() {
            match child.kind() {
                kind if kind.is_acceptor() => config.acceptors.push(transport(child, resolver)?),
                kind if kind.is_connector() => config.connectors.push(transport(child, resolver)?),
                ResourceType::SocketBroadcastGroup | ResourceType::JGroupsBroadcastGroup => {
                    config.broadcast_groups.push(broadcast_group(child, resolver)?)
                }
                ResourceType::SocketDiscoveryGroup | ResourceType::JGroupsDiscoveryGroup => {
                    config.discovery_groups.push(discovery_group(child, resolver)?)
                }
                ResourceType::ClusterConnection => {
                    config.cluster_connections.push(cluster_connection(child, resolver)?)
                }
                ResourceType::Bridge => config.bridges.push(bridge(child, resolver)?),
                ResourceType::Divert => config.diverts.push(divert(child, resolver)?),
                ResourceType::Queue | ResourceType::JmsQueue => {
                    config.queues.push(queue(child, resolver)?)
                }
                ResourceType::AddressSetting => config
                    .address_settings
                    .push((child.name().to_string(), address_settings(child, resolver)?)),
                ResourceType::SecuritySetting => config
                    .security_settings
                    .push((child.name().to_string(), roles(child, resolver)?)),
                ResourceType::ConnectorService => {
                    config.connector_services.push(connector_service(child, resolver)?)
                }
                ResourceType::GroupingHandler => {
                    config.grouping_handler = Some(grouping_handler(child, resolver)?)
                }
                _ => {}
            }
        }

        tracing::info!(
            "Bootstrapping broker '{}': {} acceptors, {} connectors, {} queues, {} diverts, {} bridges",
            config.name,
            config.acceptors.len(),
            config.connectors.len(),
            config.queues.len(),
            config.diverts.len(),
            config.bridges.len()
        );
        Ok(config)
    }
}
