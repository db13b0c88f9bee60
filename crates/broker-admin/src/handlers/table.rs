// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per resource kind handler records.

use crate::broker::configuration::{AddressSettings, Role};
use crate::broker::control::BrokerControl;
use crate::handlers::live;
use crate::model::descriptor::ResourceType;
use crate::model::{ConfigNode, ExpressionResolver, PathAddress};
use crate::operation::context::OperationContext;
use crate::operation::error::OperationError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Runtime state captured before a live change, used to undo it exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Handback {
    None,
    Long(i64),
    Int(i32),
    Bool(bool),
    AddressSettings(Option<AddressSettings>),
    Roles(Option<BTreeSet<Role>>),
}

/// Resource a live handler acts on, detached from the model.
#[derive(Debug, Clone)]
pub struct LiveTarget {
    pub address: PathAddress,
    pub node: ConfigNode,
    pub resolver: ExpressionResolver,
}

impl LiveTarget {
    /// Capture the node currently stored at `address`.
    pub fn capture(ctx: &OperationContext<'_>, address: &PathAddress) -> Result<Self, OperationError> {
        Ok(Self {
            address: address.clone(),
            node: ctx.model().read(address)?.clone(),
            resolver: ctx.resolver().clone(),
        })
    }

    /// Name of the parent resource (the match of a role).
    pub fn parent_name(&self) -> &str {
        let elements = self.address.elements();
        elements
            .len()
            .checked_sub(2)
            .and_then(|i| elements.get(i))
            .map(|e| e.value.as_str())
            .unwrap_or("")
    }
}

pub type LiveFn = fn(&dyn BrokerControl, &LiveTarget) -> Result<Handback, OperationError>;
pub type UndoFn = fn(&dyn BrokerControl, &LiveTarget, Handback) -> Result<(), OperationError>;
pub type ApplyFn = fn(&dyn BrokerControl, &LiveTarget, &Value) -> Result<Handback, OperationError>;

/// Create and destroy calls for resources applied to a running broker.
#[derive(Clone, Copy)]
pub struct LiveHandlers {
    pub create: LiveFn,
    pub undo_create: UndoFn,
    pub destroy: LiveFn,
    pub undo_destroy: UndoFn,
    /// Adding while the broker is installed but not started is an error.
    pub requires_up: bool,
}

/// Live update of one attribute.
#[derive(Clone, Copy)]
pub struct Mutator {
    pub attribute: &'static str,
    pub apply: ApplyFn,
    pub revert: UndoFn,
}

/// Extra service installed next to a reload-required resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubService {
    GroupBinding,
    HttpUpgrade,
}

/// What happens at runtime when a resource of a kind changes.
#[derive(Clone, Copy)]
pub enum RuntimePolicy {
    /// Container with no runtime counterpart.
    ModelOnly,
    /// The server itself: creates the broker.
    Broker,
    /// Takes effect on the next broker restart.
    ReloadRequired { service: Option<SubService> },
    Live(LiveHandlers),
    /// Read-only view of broker state.
    RuntimeOnly,
    /// Deprecated shape forwarded to a concrete one.
    Legacy,
}

/// Handlers of one resource kind.
#[derive(Clone, Copy)]
pub struct ResourceKindHandlers {
    pub kind: ResourceType,
    pub policy: RuntimePolicy,
    pub mutators: &'static [Mutator],
    /// At most one resource of this kind per server.
    pub unique: bool,
}

impl ResourceKindHandlers {
    pub const fn new(kind: ResourceType, policy: RuntimePolicy) -> Self {
        Self {
            kind,
            policy,
            mutators: &[],
            unique: false,
        }
    }

    pub const fn with_mutators(self, mutators: &'static [Mutator]) -> Self {
        Self { mutators, ..self }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }
}

const fn reload(service: Option<SubService>) -> RuntimePolicy {
    RuntimePolicy::ReloadRequired { service }
}

/// Handler records keyed by resource kind.
pub struct HandlerTable {
    kinds: BTreeMap<ResourceType, ResourceKindHandlers>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
        }
    }

    /// Table covering every resource kind.
    pub fn standard() -> Self {
        use ResourceType as T;

        let mut table = Self::empty();
        for handlers in [
            ResourceKindHandlers::new(T::Subsystem, RuntimePolicy::ModelOnly),
            ResourceKindHandlers::new(T::Server, RuntimePolicy::Broker)
                .with_mutators(live::SERVER_MUTATORS),
            ResourceKindHandlers::new(T::RemoteAcceptor, reload(None)),
            ResourceKindHandlers::new(T::HttpAcceptor, reload(Some(SubService::HttpUpgrade))),
            ResourceKindHandlers::new(T::InVmAcceptor, reload(None)),
            ResourceKindHandlers::new(T::Acceptor, reload(None)),
            ResourceKindHandlers::new(T::RemoteConnector, reload(None)),
            ResourceKindHandlers::new(T::HttpConnector, reload(None)),
            ResourceKindHandlers::new(T::InVmConnector, reload(None)),
            ResourceKindHandlers::new(T::Connector, reload(None)),
            ResourceKindHandlers::new(T::BroadcastGroup, RuntimePolicy::Legacy),
            ResourceKindHandlers::new(
                T::SocketBroadcastGroup,
                reload(Some(SubService::GroupBinding)),
            ),
            ResourceKindHandlers::new(
                T::JGroupsBroadcastGroup,
                reload(Some(SubService::GroupBinding)),
            ),
            ResourceKindHandlers::new(T::DiscoveryGroup, RuntimePolicy::Legacy),
            ResourceKindHandlers::new(
                T::SocketDiscoveryGroup,
                reload(Some(SubService::GroupBinding)),
            ),
            ResourceKindHandlers::new(
                T::JGroupsDiscoveryGroup,
                reload(Some(SubService::GroupBinding)),
            ),
            ResourceKindHandlers::new(T::ClusterConnection, reload(None)),
            ResourceKindHandlers::new(T::Bridge, RuntimePolicy::Live(live::BRIDGE)),
            ResourceKindHandlers::new(T::Divert, RuntimePolicy::Live(live::DIVERT)),
            ResourceKindHandlers::new(T::Queue, RuntimePolicy::Live(live::QUEUE)),
            ResourceKindHandlers::new(T::JmsQueue, RuntimePolicy::Live(live::QUEUE)),
            ResourceKindHandlers::new(T::RuntimeQueue, RuntimePolicy::RuntimeOnly),
            ResourceKindHandlers::new(T::AddressSetting, RuntimePolicy::Live(live::ADDRESS_SETTING))
                .with_mutators(live::ADDRESS_SETTING_MUTATORS),
            ResourceKindHandlers::new(
                T::SecuritySetting,
                RuntimePolicy::Live(live::SECURITY_SETTING),
            ),
            ResourceKindHandlers::new(T::Role, RuntimePolicy::Live(live::ROLE))
                .with_mutators(live::ROLE_MUTATORS),
            ResourceKindHandlers::new(T::ConnectorService, reload(None)),
            ResourceKindHandlers::new(T::GroupingHandler, reload(None)).unique(),
        ] {
            table.register(handlers);
        }
        table
    }

    /// Register (or replace) the record of a kind.
    pub fn register(&mut self, handlers: ResourceKindHandlers) {
        self.kinds.insert(handlers.kind, handlers);
    }

    pub fn get(&self, kind: ResourceType) -> Result<ResourceKindHandlers, OperationError> {
        self.kinds.get(&kind).copied().ok_or_else(|| {
            OperationError::InternalConsistency(format!("no handlers registered for {}", kind))
        })
    }

    /// Live mutator of `attribute` on `kind`.
    pub fn mutator(&self, kind: ResourceType, attribute: &str) -> Option<Mutator> {
        self.kinds
            .get(&kind)?
            .mutators
            .iter()
            .find(|m| m.attribute == attribute)
            .copied()
    }

    /// Check the table against the descriptors: every kind is handled and
    /// every live attribute has exactly one mutator.
    pub fn verify(&self) -> Result<(), OperationError> {
        for kind in ResourceType::ALL {
            let handlers = self.get(kind)?;
            let descriptor = kind.descriptor();

            for attr in descriptor.attributes.iter().filter(|a| a.is_live()) {
                let count = handlers
                    .mutators
                    .iter()
                    .filter(|m| m.attribute == attr.name)
                    .count();
                if count != 1 {
                    return Err(OperationError::InternalConsistency(format!(
                        "live attribute '{}' of {} has {} mutators",
                        attr.name, kind, count
                    )));
                }
            }

            for mutator in handlers.mutators {
                if !descriptor
                    .attribute(mutator.attribute)
                    .map(|a| a.is_live())
                    .unwrap_or(false)
                {
                    return Err(OperationError::InternalConsistency(format!(
                        "mutator for '{}' on {} targets no live attribute",
                        mutator.attribute, kind
                    )));
                }
            }
        }
        Ok(())
    }
}
