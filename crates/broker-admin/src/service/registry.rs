// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of installed runtime services.

use crate::broker::control::BrokerControl;
use crate::service::name::ServiceName;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Service {0} is already installed")]
    Duplicate(ServiceName),

    #[error("Service {0} is not installed")]
    Missing(ServiceName),
}

/// Lifecycle state of an installed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Starting,
    Up,
    Down,
}

/// Value provided by a service.
#[derive(Clone)]
pub enum ServiceValue {
    Broker(Arc<dyn BrokerControl>),
    /// Socket or JGroups endpoint of a broadcast/discovery group.
    GroupBinding { endpoint: String },
    /// HTTP upgrade bridge for an http-acceptor.
    HttpUpgrade { listener: String },
}

impl fmt::Debug for ServiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broker(broker) => f.debug_tuple("Broker").field(&broker.name()).finish(),
            Self::GroupBinding { endpoint } => f
                .debug_struct("GroupBinding")
                .field("endpoint", endpoint)
                .finish(),
            Self::HttpUpgrade { listener } => f
                .debug_struct("HttpUpgrade")
                .field("listener", listener)
                .finish(),
        }
    }
}

/// One installed service.
#[derive(Debug, Clone)]
pub struct ServiceController {
    pub name: ServiceName,
    pub state: ServiceState,
    pub value: ServiceValue,
}

impl ServiceController {
    pub fn broker(&self) -> Option<&Arc<dyn BrokerControl>> {
        match &self.value {
            ServiceValue::Broker(broker) => Some(broker),
            _ => None,
        }
    }
}

/// Installed services by name.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: RwLock<BTreeMap<ServiceName, ServiceController>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a service.
    pub fn install(
        &self,
        name: ServiceName,
        value: ServiceValue,
        state: ServiceState,
    ) -> Result<(), RegistryError> {
        let mut services = self.services.write();
        if services.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!("Installed service {} ({:?})", name, state);
        services.insert(name.clone(), ServiceController { name, state, value });
        Ok(())
    }

    /// Put back a previously removed controller, replacing any current one.
    pub fn restore(&self, controller: ServiceController) {
        self.services
            .write()
            .insert(controller.name.clone(), controller);
    }

    pub fn remove(&self, name: &ServiceName) -> Option<ServiceController> {
        let removed = self.services.write().remove(name);
        if removed.is_some() {
            tracing::debug!("Removed service {}", name);
        }
        removed
    }

    /// Remove a service and every service below it.
    pub fn remove_tree(&self, root: &ServiceName) -> Vec<ServiceController> {
        let mut services = self.services.write();
        let names: Vec<_> = services
            .keys()
            .filter(|n| n.is_under(root))
            .cloned()
            .collect();
        names
            .iter()
            .filter_map(|n| services.remove(n))
            .collect()
    }

    pub fn get(&self, name: &ServiceName) -> Option<ServiceController> {
        self.services.read().get(name).cloned()
    }

    pub fn contains(&self, name: &ServiceName) -> bool {
        self.services.read().contains_key(name)
    }

    pub fn state(&self, name: &ServiceName) -> Option<ServiceState> {
        self.services.read().get(name).map(|c| c.state)
    }

    pub fn set_state(&self, name: &ServiceName, state: ServiceState) -> Result<(), RegistryError> {
        let mut services = self.services.write();
        let controller = services
            .get_mut(name)
            .ok_or_else(|| RegistryError::Missing(name.clone()))?;
        controller.state = state;
        Ok(())
    }

    /// Replace the value of an installed service.
    pub fn set_value(&self, name: &ServiceName, value: ServiceValue) -> Result<(), RegistryError> {
        let mut services = self.services.write();
        let controller = services
            .get_mut(name)
            .ok_or_else(|| RegistryError::Missing(name.clone()))?;
        controller.value = value;
        Ok(())
    }

    pub fn names(&self) -> Vec<ServiceName> {
        self.services.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(endpoint: &str) -> ServiceValue {
        ServiceValue::GroupBinding {
            endpoint: endpoint.to_string(),
        }
    }

    #[test]
    fn test_install_and_duplicate() {
        let registry = ServiceRegistry::new();
        let name = ServiceName::broker("a").append("socket-broadcast-group").append("bg");
        registry
            .install(name.clone(), binding("udp"), ServiceState::Up)
            .expect("install");
        assert_eq!(registry.state(&name), Some(ServiceState::Up));
        assert_eq!(
            registry.install(name.clone(), binding("udp"), ServiceState::Up),
            Err(RegistryError::Duplicate(name))
        );
    }

    #[test]
    fn test_set_state_missing() {
        let registry = ServiceRegistry::new();
        assert!(registry
            .set_state(&ServiceName::broker("a"), ServiceState::Down)
            .is_err());
    }

    #[test]
    fn test_remove_tree() {
        let registry = ServiceRegistry::new();
        let a = ServiceName::broker("a");
        registry
            .install(a.append("x"), binding("1"), ServiceState::Up)
            .expect("install");
        registry
            .install(a.append("y"), binding("2"), ServiceState::Up)
            .expect("install");
        registry
            .install(ServiceName::broker("b"), binding("3"), ServiceState::Up)
            .expect("install");

        let removed = registry.remove_tree(&a);
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.len(), 1);

        for controller in removed {
            registry.restore(controller);
        }
        assert_eq!(registry.len(), 3);
    }
}
