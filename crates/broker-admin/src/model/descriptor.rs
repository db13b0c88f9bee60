// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resource types and their attribute descriptors.

use crate::model::attribute::{AttributeDefinition as Attr, AttributeKind, Corrector};
use std::fmt;

/// Every resource type of the management tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Subsystem,
    Server,
    RemoteAcceptor,
    HttpAcceptor,
    InVmAcceptor,
    Acceptor,
    RemoteConnector,
    HttpConnector,
    InVmConnector,
    Connector,
    /// Deprecated shape, resolved to a socket or JGroups broadcast group.
    BroadcastGroup,
    SocketBroadcastGroup,
    JGroupsBroadcastGroup,
    /// Deprecated shape, resolved to a socket or JGroups discovery group.
    DiscoveryGroup,
    SocketDiscoveryGroup,
    JGroupsDiscoveryGroup,
    ClusterConnection,
    Bridge,
    Divert,
    Queue,
    JmsQueue,
    /// Read-only view of a live broker queue with no managed resource.
    RuntimeQueue,
    AddressSetting,
    SecuritySetting,
    Role,
    ConnectorService,
    GroupingHandler,
}

impl ResourceType {
    pub const ALL: [ResourceType; 27] = [
        Self::Subsystem,
        Self::Server,
        Self::RemoteAcceptor,
        Self::HttpAcceptor,
        Self::InVmAcceptor,
        Self::Acceptor,
        Self::RemoteConnector,
        Self::HttpConnector,
        Self::InVmConnector,
        Self::Connector,
        Self::BroadcastGroup,
        Self::SocketBroadcastGroup,
        Self::JGroupsBroadcastGroup,
        Self::DiscoveryGroup,
        Self::SocketDiscoveryGroup,
        Self::JGroupsDiscoveryGroup,
        Self::ClusterConnection,
        Self::Bridge,
        Self::Divert,
        Self::Queue,
        Self::JmsQueue,
        Self::RuntimeQueue,
        Self::AddressSetting,
        Self::SecuritySetting,
        Self::Role,
        Self::ConnectorService,
        Self::GroupingHandler,
    ];

    /// Address key of this type.
    pub fn key(self) -> &'static str {
        match self {
            Self::Subsystem => "subsystem",
            Self::Server => "server",
            Self::RemoteAcceptor => "remote-acceptor",
            Self::HttpAcceptor => "http-acceptor",
            Self::InVmAcceptor => "in-vm-acceptor",
            Self::Acceptor => "acceptor",
            Self::RemoteConnector => "remote-connector",
            Self::HttpConnector => "http-connector",
            Self::InVmConnector => "in-vm-connector",
            Self::Connector => "connector",
            Self::BroadcastGroup => "broadcast-group",
            Self::SocketBroadcastGroup => "socket-broadcast-group",
            Self::JGroupsBroadcastGroup => "jgroups-broadcast-group",
            Self::DiscoveryGroup => "discovery-group",
            Self::SocketDiscoveryGroup => "socket-discovery-group",
            Self::JGroupsDiscoveryGroup => "jgroups-discovery-group",
            Self::ClusterConnection => "cluster-connection",
            Self::Bridge => "bridge",
            Self::Divert => "divert",
            Self::Queue => "queue",
            Self::JmsQueue => "jms-queue",
            Self::RuntimeQueue => "runtime-queue",
            Self::AddressSetting => "address-setting",
            Self::SecuritySetting => "security-setting",
            Self::Role => "role",
            Self::ConnectorService => "connector-service",
            Self::GroupingHandler => "grouping-handler",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }

    /// Type of the parent resource.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Subsystem => None,
            Self::Server => Some(Self::Subsystem),
            Self::Role => Some(Self::SecuritySetting),
            _ => Some(Self::Server),
        }
    }

    /// Deprecated shapes resolved at runtime into a concrete shape.
    pub fn is_generic_group(self) -> bool {
        matches!(self, Self::BroadcastGroup | Self::DiscoveryGroup)
    }

    /// Types whose resources cannot be added or removed.
    pub fn is_runtime_only(self) -> bool {
        matches!(self, Self::RuntimeQueue)
    }

    pub fn is_acceptor(self) -> bool {
        matches!(
            self,
            Self::RemoteAcceptor | Self::HttpAcceptor | Self::InVmAcceptor | Self::Acceptor
        )
    }

    pub fn is_connector(self) -> bool {
        matches!(
            self,
            Self::RemoteConnector | Self::HttpConnector | Self::InVmConnector | Self::Connector
        )
    }

    pub fn descriptor(self) -> &'static ResourceDescriptor {
        match self {
            Self::Subsystem => &SUBSYSTEM,
            Self::Server => &SERVER,
            Self::RemoteAcceptor => &REMOTE_ACCEPTOR,
            Self::HttpAcceptor => &HTTP_ACCEPTOR,
            Self::InVmAcceptor => &IN_VM_ACCEPTOR,
            Self::Acceptor => &ACCEPTOR,
            Self::RemoteConnector => &REMOTE_CONNECTOR,
            Self::HttpConnector => &HTTP_CONNECTOR,
            Self::InVmConnector => &IN_VM_CONNECTOR,
            Self::Connector => &CONNECTOR,
            Self::BroadcastGroup => &BROADCAST_GROUP,
            Self::SocketBroadcastGroup => &SOCKET_BROADCAST_GROUP,
            Self::JGroupsBroadcastGroup => &JGROUPS_BROADCAST_GROUP,
            Self::DiscoveryGroup => &DISCOVERY_GROUP,
            Self::SocketDiscoveryGroup => &SOCKET_DISCOVERY_GROUP,
            Self::JGroupsDiscoveryGroup => &JGROUPS_DISCOVERY_GROUP,
            Self::ClusterConnection => &CLUSTER_CONNECTION,
            Self::Bridge => &BRIDGE,
            Self::Divert => &DIVERT,
            Self::Queue => &QUEUE,
            Self::JmsQueue => &JMS_QUEUE,
            Self::RuntimeQueue => &RUNTIME_QUEUE,
            Self::AddressSetting => &ADDRESS_SETTING,
            Self::SecuritySetting => &SECURITY_SETTING,
            Self::Role => &ROLE,
            Self::ConnectorService => &CONNECTOR_SERVICE,
            Self::GroupingHandler => &GROUPING_HANDLER,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Declared shape of a resource type.
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub kind: ResourceType,
    pub attributes: &'static [Attr],
    /// Groups of alternatives of which at least one must be defined.
    pub one_of: &'static [&'static [&'static str]],
    /// Custom runtime operations.
    pub operations: &'static [&'static str],
}

impl ResourceDescriptor {
    pub fn attribute(&self, name: &str) -> Option<&'static Attr> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn configuration_attributes(&self) -> impl Iterator<Item = &'static Attr> {
        self.attributes.iter().filter(|a| !a.is_runtime())
    }

    pub fn runtime_attributes(&self) -> impl Iterator<Item = &'static Attr> {
        self.attributes.iter().filter(|a| a.is_runtime())
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains(&name)
    }
}

// Server control operations.
pub const RESET_ALL_MESSAGE_COUNTERS: &str = "reset-all-message-counters";
pub const RESET_ALL_MESSAGE_COUNTER_HISTORIES: &str = "reset-all-message-counter-histories";
pub const LIST_CONNECTION_IDS: &str = "list-connection-ids";
pub const GET_CONNECTORS_AS_JSON: &str = "get-connectors-as-json";
pub const GET_ROLES: &str = "get-roles";
pub const GET_ADDRESS_SETTINGS_AS_JSON: &str = "get-address-settings-as-json";
pub const FORCE_FAILOVER: &str = "force-failover";

// Queue control operations.
pub const PAUSE: &str = "pause";
pub const RESUME: &str = "resume";
pub const COUNT_MESSAGES: &str = "count-messages";
pub const RESET_MESSAGE_COUNTER: &str = "reset-message-counter";

const SERVER_OPERATIONS: &[&str] = &[
    RESET_ALL_MESSAGE_COUNTERS,
    RESET_ALL_MESSAGE_COUNTER_HISTORIES,
    LIST_CONNECTION_IDS,
    GET_CONNECTORS_AS_JSON,
    GET_ROLES,
    GET_ADDRESS_SETTINGS_AS_JSON,
    FORCE_FAILOVER,
];

const QUEUE_OPERATIONS: &[&str] = &[PAUSE, RESUME, COUNT_MESSAGES, RESET_MESSAGE_COUNTER];

const JOURNAL_TYPES: &[&str] = &["ASYNCIO", "NIO"];
const ADDRESS_FULL_POLICIES: &[&str] = &["PAGE", "BLOCK", "DROP", "FAIL"];
const ROUTING_TYPES: &[&str] = &["ANYCAST", "MULTICAST"];
const DIVERT_ROUTING_TYPES: &[&str] = &["STRIP", "PASS", "ANYCAST", "MULTICAST"];
const LOAD_BALANCING_TYPES: &[&str] = &["OFF", "STRICT", "ON_DEMAND", "OFF_WITH_REDISTRIBUTION"];
const GROUPING_TYPES: &[&str] = &["LOCAL", "REMOTE"];

static SUBSYSTEM: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Subsystem,
    attributes: &[],
    one_of: &[],
    operations: &[],
};

static SERVER: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Server,
    attributes: &[
        Attr::boolean("persistence-enabled").default_bool(true),
        Attr::boolean("security-enabled").default_bool(true),
        Attr::string("security-domain").alternatives(&["elytron-domain"]),
        Attr::string("elytron-domain").alternatives(&["security-domain"]),
        Attr::string("cluster-user").default_str("ACTIVEMQ.CLUSTER.ADMIN.USER"),
        Attr::string("cluster-password").default_str("CHANGE ME!!"),
        Attr::string("journal-type")
            .default_str("ASYNCIO")
            .allowed(JOURNAL_TYPES),
        Attr::long("journal-file-size")
            .default_int(10_485_760)
            .range(1024, i64::MAX),
        Attr::long("transaction-timeout")
            .default_int(300_000)
            .range(0, i64::MAX),
        Attr::int("id-cache-size").default_int(20_000).range(0, i32::MAX as i64),
        Attr::string("management-address")
            .default_str("activemq.management")
            .corrected(Corrector::Address),
        Attr::boolean("jmx-management-enabled").default_bool(false),
        Attr::boolean("wild-card-routing-enabled").default_bool(true),
        Attr::boolean("statistics-enabled").default_bool(false).live(),
        Attr::long("message-counter-sample-period")
            .default_int(10_000)
            .range(1000, i64::MAX)
            .live(),
        Attr::int("message-counter-max-day-history")
            .default_int(10)
            .range(1, i32::MAX as i64)
            .live(),
        Attr::runtime("started", AttributeKind::Boolean),
        Attr::runtime("active", AttributeKind::Boolean),
        Attr::runtime("version", AttributeKind::String),
        Attr::runtime("runtime-journal-type", AttributeKind::String),
    ],
    one_of: &[],
    operations: SERVER_OPERATIONS,
};

static REMOTE_ACCEPTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::RemoteAcceptor,
    attributes: &[
        Attr::string("socket-binding").required(),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static HTTP_ACCEPTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::HttpAcceptor,
    attributes: &[
        Attr::string("http-listener").required(),
        Attr::boolean("upgrade-legacy").default_bool(true),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static IN_VM_ACCEPTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::InVmAcceptor,
    attributes: &[
        Attr::int("server-id").required().range(0, i32::MAX as i64),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static ACCEPTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Acceptor,
    attributes: &[
        Attr::string("factory-class").required(),
        Attr::string("socket-binding"),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static REMOTE_CONNECTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::RemoteConnector,
    attributes: &[
        Attr::string("socket-binding").required(),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static HTTP_CONNECTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::HttpConnector,
    attributes: &[
        Attr::string("socket-binding").required(),
        Attr::string("endpoint").required(),
        Attr::string("server-name"),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static IN_VM_CONNECTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::InVmConnector,
    attributes: &[
        Attr::int("server-id").required().range(0, i32::MAX as i64),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static CONNECTOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Connector,
    attributes: &[
        Attr::string("factory-class").required(),
        Attr::string("socket-binding"),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static BROADCAST_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::BroadcastGroup,
    attributes: &[
        Attr::string("socket-binding").alternatives(&["jgroups-cluster"]),
        Attr::string("jgroups-cluster").alternatives(&["socket-binding"]),
        Attr::string("jgroups-channel"),
        Attr::long("broadcast-period")
            .default_int(2000)
            .range(1, i64::MAX),
        Attr::list("connectors"),
    ],
    one_of: &[&["socket-binding", "jgroups-cluster"]],
    operations: &[],
};

static SOCKET_BROADCAST_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::SocketBroadcastGroup,
    attributes: &[
        Attr::string("socket-binding").required(),
        Attr::long("broadcast-period")
            .default_int(2000)
            .range(1, i64::MAX),
        Attr::list("connectors"),
    ],
    one_of: &[],
    operations: &[],
};

static JGROUPS_BROADCAST_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::JGroupsBroadcastGroup,
    attributes: &[
        Attr::string("jgroups-cluster").required(),
        Attr::string("jgroups-channel"),
        Attr::long("broadcast-period")
            .default_int(2000)
            .range(1, i64::MAX),
        Attr::list("connectors"),
    ],
    one_of: &[],
    operations: &[],
};

static DISCOVERY_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::DiscoveryGroup,
    attributes: &[
        Attr::string("socket-binding").alternatives(&["jgroups-cluster"]),
        Attr::string("jgroups-cluster").alternatives(&["socket-binding"]),
        Attr::string("jgroups-channel"),
        Attr::long("refresh-timeout").default_int(10_000),
        Attr::long("initial-wait-timeout").default_int(10_000),
    ],
    one_of: &[&["socket-binding", "jgroups-cluster"]],
    operations: &[],
};

static SOCKET_DISCOVERY_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::SocketDiscoveryGroup,
    attributes: &[
        Attr::string("socket-binding").required(),
        Attr::long("refresh-timeout").default_int(10_000),
        Attr::long("initial-wait-timeout").default_int(10_000),
    ],
    one_of: &[],
    operations: &[],
};

static JGROUPS_DISCOVERY_GROUP: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::JGroupsDiscoveryGroup,
    attributes: &[
        Attr::string("jgroups-cluster").required(),
        Attr::string("jgroups-channel"),
        Attr::long("refresh-timeout").default_int(10_000),
        Attr::long("initial-wait-timeout").default_int(10_000),
    ],
    one_of: &[],
    operations: &[],
};

static CLUSTER_CONNECTION: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::ClusterConnection,
    attributes: &[
        Attr::string("cluster-connection-address")
            .required()
            .corrected(Corrector::Address),
        Attr::string("connector-name").required(),
        Attr::list("static-connectors").alternatives(&["discovery-group"]),
        Attr::string("discovery-group").alternatives(&["static-connectors"]),
        Attr::boolean("allow-direct-connections-only").default_bool(false),
        Attr::long("retry-interval").default_int(500),
        Attr::boolean("use-duplicate-detection").default_bool(true),
        Attr::string("message-load-balancing-type")
            .default_str("ON_DEMAND")
            .allowed(LOAD_BALANCING_TYPES),
        Attr::int("max-hops").default_int(1).range(0, i32::MAX as i64),
        Attr::long("call-timeout").default_int(30_000),
    ],
    one_of: &[],
    operations: &[],
};

static BRIDGE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Bridge,
    attributes: &[
        Attr::string("queue-name").required(),
        Attr::string("forwarding-address").corrected(Corrector::Address),
        Attr::string("filter"),
        Attr::list("static-connectors").alternatives(&["discovery-group"]),
        Attr::string("discovery-group").alternatives(&["static-connectors"]),
        Attr::boolean("ha").default_bool(false),
        Attr::long("retry-interval").default_int(2000),
        Attr::int("reconnect-attempts").default_int(-1),
        Attr::boolean("use-duplicate-detection").default_bool(true),
        Attr::string("user"),
        Attr::string("password"),
        Attr::string("transformer-class-name"),
    ],
    one_of: &[&["static-connectors", "discovery-group"]],
    operations: &[],
};

static DIVERT: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Divert,
    attributes: &[
        Attr::string("divert-address")
            .required()
            .corrected(Corrector::Address),
        Attr::string("forwarding-address")
            .required()
            .corrected(Corrector::Address),
        Attr::string("filter"),
        Attr::boolean("exclusive").default_bool(false),
        Attr::string("routing-name"),
        Attr::string("routing-type")
            .default_str("STRIP")
            .allowed(DIVERT_ROUTING_TYPES),
        Attr::string("transformer-class-name"),
    ],
    one_of: &[],
    operations: &[],
};

const QUEUE_METRICS: [Attr; 7] = [
    Attr::runtime("message-count", AttributeKind::Long),
    Attr::runtime("delivering-count", AttributeKind::Int),
    Attr::runtime("messages-added", AttributeKind::Long),
    Attr::runtime("consumer-count", AttributeKind::Int),
    Attr::runtime("scheduled-count", AttributeKind::Long),
    Attr::runtime("paused", AttributeKind::Boolean),
    Attr::runtime("temporary", AttributeKind::Boolean),
];

static QUEUE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Queue,
    attributes: &[
        Attr::string("queue-address")
            .required()
            .corrected(Corrector::Address),
        Attr::string("filter"),
        Attr::boolean("durable").default_bool(true),
        Attr::string("routing-type")
            .default_str("MULTICAST")
            .allowed(ROUTING_TYPES),
        QUEUE_METRICS[0],
        QUEUE_METRICS[1],
        QUEUE_METRICS[2],
        QUEUE_METRICS[3],
        QUEUE_METRICS[4],
        QUEUE_METRICS[5],
        QUEUE_METRICS[6],
    ],
    one_of: &[],
    operations: QUEUE_OPERATIONS,
};

static JMS_QUEUE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::JmsQueue,
    attributes: &[
        Attr::list("entries").required(),
        Attr::boolean("durable").default_bool(true),
        Attr::string("selector"),
        QUEUE_METRICS[0],
        QUEUE_METRICS[1],
        QUEUE_METRICS[2],
        QUEUE_METRICS[3],
        QUEUE_METRICS[4],
        QUEUE_METRICS[5],
        QUEUE_METRICS[6],
    ],
    one_of: &[],
    operations: QUEUE_OPERATIONS,
};

static RUNTIME_QUEUE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::RuntimeQueue,
    attributes: &[
        Attr::runtime("queue-address", AttributeKind::String),
        Attr::runtime("durable", AttributeKind::Boolean),
        Attr::runtime("filter", AttributeKind::String),
        Attr::runtime("routing-type", AttributeKind::String),
        QUEUE_METRICS[0],
        QUEUE_METRICS[1],
        QUEUE_METRICS[2],
        QUEUE_METRICS[3],
        QUEUE_METRICS[4],
        QUEUE_METRICS[5],
        QUEUE_METRICS[6],
    ],
    one_of: &[],
    operations: QUEUE_OPERATIONS,
};

static ADDRESS_SETTING: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::AddressSetting,
    attributes: &[
        Attr::string("dead-letter-address")
            .corrected(Corrector::Address)
            .live(),
        Attr::string("expiry-address")
            .corrected(Corrector::Address)
            .live(),
        Attr::long("expiry-delay").default_int(-1).live(),
        Attr::long("redelivery-delay").default_int(0).live(),
        Attr::int("max-delivery-attempts").default_int(10).live(),
        Attr::long("max-size-bytes").default_int(-1).live(),
        Attr::long("page-size-bytes").default_int(10_485_760).live(),
        Attr::string("address-full-policy")
            .default_str("PAGE")
            .allowed(ADDRESS_FULL_POLICIES)
            .live(),
        Attr::int("message-counter-history-day-limit")
            .default_int(0)
            .live(),
        Attr::long("redistribution-delay").default_int(-1).live(),
        Attr::boolean("send-to-dla-on-no-route")
            .default_bool(false)
            .live(),
        Attr::boolean("last-value-queue").default_bool(false).live(),
        Attr::boolean("auto-create-queues").default_bool(true).live(),
        Attr::boolean("auto-delete-queues").default_bool(true).live(),
        Attr::boolean("auto-create-addresses").default_bool(true).live(),
    ],
    one_of: &[],
    operations: &[],
};

static SECURITY_SETTING: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::SecuritySetting,
    attributes: &[],
    one_of: &[],
    operations: &[],
};

/// Permission attributes of a security role, in broker order.
pub const ROLE_PERMISSIONS: [&str; 10] = [
    "send",
    "consume",
    "create-durable-queue",
    "delete-durable-queue",
    "create-non-durable-queue",
    "delete-non-durable-queue",
    "manage",
    "browse",
    "create-address",
    "delete-address",
];

static ROLE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::Role,
    attributes: &[
        Attr::boolean(ROLE_PERMISSIONS[0]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[1]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[2]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[3]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[4]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[5]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[6]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[7]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[8]).default_bool(false).live(),
        Attr::boolean(ROLE_PERMISSIONS[9]).default_bool(false).live(),
    ],
    one_of: &[],
    operations: &[],
};

static CONNECTOR_SERVICE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::ConnectorService,
    attributes: &[
        Attr::string("factory-class").required(),
        Attr::properties("params"),
    ],
    one_of: &[],
    operations: &[],
};

static GROUPING_HANDLER: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceType::GroupingHandler,
    attributes: &[
        Attr::string("type").required().allowed(GROUPING_TYPES),
        Attr::string("grouping-handler-address")
            .required()
            .corrected(Corrector::Address),
        Attr::long("timeout").default_int(5000),
        Attr::long("group-timeout").default_int(-1),
        Attr::long("reaper-period").default_int(30_000),
    ],
    one_of: &[],
    operations: &[],
};
