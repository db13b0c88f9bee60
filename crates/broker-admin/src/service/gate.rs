// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle gate.
//!
//! Observes the broker backing an address and tells callers whether they
//! may touch it. A passive backup is a normal condition: reads against it
//! come back undefined and writes are turned away or deferred, never failed
//! as faults.

use crate::broker::control::BrokerControl;
use crate::model::PathAddress;
use crate::service::locator::locate_broker;
use crate::service::registry::{ServiceRegistry, ServiceState};
use std::fmt;
use std::sync::Arc;

/// Standby message surfaced to operators.
pub const STANDBY_MESSAGE: &str = "broker is in standby";

/// Observed state of a broker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    /// No broker service installed.
    Absent,
    /// Installed but not (or no longer) started.
    InstalledDown,
    /// Started as a passive backup.
    UpPassive,
    /// Started and serving.
    UpActive,
}

impl BrokerState {
    pub fn is_present(self) -> bool {
        self != Self::Absent
    }

    pub fn is_up(self) -> bool {
        matches!(self, Self::UpPassive | Self::UpActive)
    }
}

impl fmt::Display for BrokerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::InstalledDown => "installed-down",
            Self::UpPassive => "up-passive",
            Self::UpActive => "up-active",
        };
        f.write_str(s)
    }
}

/// Decision for a runtime write.
pub enum WriteGate {
    Proceed(Arc<dyn BrokerControl>),
    RollbackWith(&'static str),
    Defer,
}

/// Decision for a runtime read.
pub enum ReadGate {
    Proceed(Arc<dyn BrokerControl>),
    Undefined,
}

/// Gate over the service registry.
#[derive(Clone, Copy)]
pub struct LifecycleGate<'a> {
    registry: &'a ServiceRegistry,
}

impl<'a> LifecycleGate<'a> {
    pub fn new(registry: &'a ServiceRegistry) -> Self {
        Self { registry }
    }

    fn observe(&self, address: &PathAddress) -> (BrokerState, Option<Arc<dyn BrokerControl>>) {
        let Some(controller) = self.registry.get(&locate_broker(address)) else {
            return (BrokerState::Absent, None);
        };
        let Some(broker) = controller.broker().cloned() else {
            return (BrokerState::Absent, None);
        };
        let state = if controller.state != ServiceState::Up || !broker.is_started() {
            BrokerState::InstalledDown
        } else if broker.is_active() {
            BrokerState::UpActive
        } else {
            BrokerState::UpPassive
        };
        (state, Some(broker))
    }

    /// State of the broker backing `address`.
    pub fn state(&self, address: &PathAddress) -> BrokerState {
        self.observe(address).0
    }

    /// True only when the broker is up and active.
    pub fn is_active(&self, address: &PathAddress) -> bool {
        self.state(address) == BrokerState::UpActive
    }

    /// Broker handle when up and active.
    pub fn active_broker(&self, address: &PathAddress) -> Option<Arc<dyn BrokerControl>> {
        match self.observe(address) {
            (BrokerState::UpActive, broker) => broker,
            _ => None,
        }
    }

    pub fn gate_write(&self, address: &PathAddress) -> WriteGate {
        match self.observe(address) {
            (BrokerState::UpActive, Some(broker)) => WriteGate::Proceed(broker),
            (BrokerState::UpPassive, _) => WriteGate::RollbackWith(STANDBY_MESSAGE),
            _ => WriteGate::Defer,
        }
    }

    pub fn gate_read(&self, address: &PathAddress) -> ReadGate {
        match self.observe(address) {
            (BrokerState::UpActive, Some(broker)) => ReadGate::Proceed(broker),
            _ => ReadGate::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::configuration::BrokerConfiguration;
    use crate::broker::embedded::EmbeddedBroker;
    use crate::service::name::ServiceName;
    use crate::service::registry::ServiceValue;

    fn install(registry: &ServiceRegistry, backup: bool) -> Arc<EmbeddedBroker> {
        let broker = Arc::new(EmbeddedBroker::new(
            BrokerConfiguration::named("default"),
            backup,
        ));
        registry
            .install(
                ServiceName::broker("default"),
                ServiceValue::Broker(broker.clone()),
                ServiceState::Up,
            )
            .expect("install");
        broker
    }

    fn queue_address() -> PathAddress {
        PathAddress::server("default").append("queue", "q1")
    }

    #[test]
    fn test_absent() {
        let registry = ServiceRegistry::new();
        let gate = LifecycleGate::new(&registry);
        assert_eq!(gate.state(&queue_address()), BrokerState::Absent);
        assert!(matches!(gate.gate_write(&queue_address()), WriteGate::Defer));
        assert!(matches!(gate.gate_read(&queue_address()), ReadGate::Undefined));
    }

    #[test]
    fn test_active() {
        let registry = ServiceRegistry::new();
        install(&registry, false);
        let gate = LifecycleGate::new(&registry);
        assert!(gate.is_active(&queue_address()));
        assert!(matches!(
            gate.gate_write(&queue_address()),
            WriteGate::Proceed(_)
        ));
        assert!(matches!(gate.gate_read(&queue_address()), ReadGate::Proceed(_)));
    }

    #[test]
    fn test_passive() {
        let registry = ServiceRegistry::new();
        install(&registry, true);
        let gate = LifecycleGate::new(&registry);
        assert_eq!(gate.state(&queue_address()), BrokerState::UpPassive);
        assert!(!gate.is_active(&queue_address()));
        assert!(matches!(
            gate.gate_write(&queue_address()),
            WriteGate::RollbackWith(STANDBY_MESSAGE)
        ));
        assert!(matches!(gate.gate_read(&queue_address()), ReadGate::Undefined));
    }

    #[test]
    fn test_installed_down() {
        let registry = ServiceRegistry::new();
        let broker = install(&registry, false);
        let gate = LifecycleGate::new(&registry);

        registry
            .set_state(&ServiceName::broker("default"), ServiceState::Starting)
            .expect("set state");
        assert_eq!(gate.state(&queue_address()), BrokerState::InstalledDown);

        registry
            .set_state(&ServiceName::broker("default"), ServiceState::Up)
            .expect("set state");
        broker.stop().expect("stop");
        assert_eq!(gate.state(&queue_address()), BrokerState::InstalledDown);
        assert!(matches!(gate.gate_write(&queue_address()), WriteGate::Defer));
    }
}
