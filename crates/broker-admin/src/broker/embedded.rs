// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory broker.
//!
//! Keeps the state a real broker exposes through its control API, records
//! every control call, and can be told to fail the next call of a given
//! name.

use crate::broker::configuration::{
    AddressSettings, BridgeConfiguration, BrokerConfiguration, DivertConfiguration,
    QueueConfiguration, Role, TransportConfiguration,
};
use crate::broker::control::{BrokerControl, BrokerFactory, ControlError, QueueStatus};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Version reported by embedded brokers.
pub const EMBEDDED_VERSION: &str = "2.33.0";

#[derive(Debug, Clone)]
struct QueueState {
    config: QueueConfiguration,
    temporary: bool,
    paused: bool,
    message_count: i64,
    delivering_count: i32,
    messages_added: i64,
    consumer_count: i32,
    scheduled_count: i64,
}

impl QueueState {
    fn new(config: QueueConfiguration) -> Self {
        Self {
            config,
            temporary: false,
            paused: false,
            message_count: 0,
            delivering_count: 0,
            messages_added: 0,
            consumer_count: 0,
            scheduled_count: 0,
        }
    }

    fn status(&self) -> QueueStatus {
        QueueStatus {
            name: self.config.name.clone(),
            address: self.config.address.clone(),
            routing_type: self.config.routing_type.clone(),
            filter: self.config.filter.clone(),
            durable: self.config.durable,
            temporary: self.temporary,
            paused: self.paused,
            message_count: self.message_count,
            delivering_count: self.delivering_count,
            messages_added: self.messages_added,
            consumer_count: self.consumer_count,
            scheduled_count: self.scheduled_count,
        }
    }
}

#[derive(Debug)]
struct BrokerState {
    started: bool,
    active: bool,
    journal_type: String,
    connectors: Vec<TransportConfiguration>,
    diverts: BTreeMap<String, DivertConfiguration>,
    bridges: BTreeMap<String, BridgeConfiguration>,
    queues: BTreeMap<String, QueueState>,
    counters_enabled: bool,
    sample_period: i64,
    max_day_count: i32,
    settings: BTreeMap<String, AddressSettings>,
    security: BTreeMap<String, BTreeSet<Role>>,
    connections: Vec<String>,
    calls: Vec<String>,
    fail_next: Option<String>,
}

/// Comparable view of the live broker state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerSnapshot {
    pub diverts: BTreeMap<String, DivertConfiguration>,
    pub bridges: BTreeMap<String, BridgeConfiguration>,
    pub queues: BTreeMap<String, QueueConfiguration>,
    pub address_settings: BTreeMap<String, AddressSettings>,
    pub security_settings: BTreeMap<String, BTreeSet<Role>>,
    pub message_counter_enabled: bool,
    pub message_counter_sample_period: i64,
    pub message_counter_max_day_history: i32,
}

/// Broker kept entirely in memory.
#[derive(Debug)]
pub struct EmbeddedBroker {
    name: String,
    configuration: BrokerConfiguration,
    state: Mutex<BrokerState>,
}

impl EmbeddedBroker {
    /// Create a started broker from its complete configuration.
    pub fn new(configuration: BrokerConfiguration, backup: bool) -> Self {
        let state = BrokerState {
            started: true,
            active: !backup,
            journal_type: configuration.journal_type.clone(),
            connectors: configuration.connectors.clone(),
            diverts: configuration
                .diverts
                .iter()
                .map(|d| (d.name.clone(), d.clone()))
                .collect(),
            bridges: configuration
                .bridges
                .iter()
                .map(|b| (b.name.clone(), b.clone()))
                .collect(),
            queues: configuration
                .queues
                .iter()
                .map(|q| (q.name.clone(), QueueState::new(q.clone())))
                .collect(),
            counters_enabled: configuration.message_counter_enabled,
            sample_period: configuration.message_counter_sample_period,
            max_day_count: configuration.message_counter_max_day_history,
            settings: configuration.address_settings.iter().cloned().collect(),
            security: configuration.security_settings.iter().cloned().collect(),
            connections: Vec::new(),
            calls: Vec::new(),
            fail_next: None,
        };

        Self {
            name: configuration.name.clone(),
            configuration,
            state: Mutex::new(state),
        }
    }

    /// Configuration the broker was created with.
    pub fn configuration(&self) -> &BrokerConfiguration {
        &self.configuration
    }

    /// Control calls made so far, as `name(argument)`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Fail the next control call named `operation`.
    pub fn fail_next(&self, operation: &str) {
        self.state.lock().fail_next = Some(operation.to_string());
    }

    /// Switch between live and passive backup.
    pub fn set_active(&self, active: bool) {
        self.state.lock().active = active;
    }

    /// Register a client connection.
    pub fn open_connection(&self, id: &str) {
        self.state.lock().connections.push(id.to_string());
    }

    /// Route `count` messages to a queue.
    pub fn send(&self, queue: &str, count: i64) -> Result<(), ControlError> {
        let mut state = self.state.lock();
        let q = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| ControlError::not_found("Queue", queue))?;
        q.message_count += count;
        q.messages_added += count;
        Ok(())
    }

    pub fn snapshot(&self) -> BrokerSnapshot {
        let state = self.state.lock();
        BrokerSnapshot {
            diverts: state.diverts.clone(),
            bridges: state.bridges.clone(),
            queues: state
                .queues
                .iter()
                .map(|(name, q)| (name.clone(), q.config.clone()))
                .collect(),
            address_settings: state.settings.clone(),
            security_settings: state.security.clone(),
            message_counter_enabled: state.counters_enabled,
            message_counter_sample_period: state.sample_period,
            message_counter_max_day_history: state.max_day_count,
        }
    }

    /// Record a call and fire a pending injected failure.
    fn call<T>(
        &self,
        operation: &str,
        argument: impl std::fmt::Display,
        f: impl FnOnce(&mut BrokerState) -> Result<T, ControlError>,
    ) -> Result<T, ControlError> {
        let mut state = self.state.lock();
        state.calls.push(format!("{}({})", operation, argument));
        if state.fail_next.as_deref() == Some(operation) {
            state.fail_next = None;
            tracing::debug!("Injected failure for {} on broker '{}'", operation, self.name);
            return Err(ControlError::Failed(format!("{} failed (injected)", operation)));
        }
        f(&mut state)
    }

    fn with_queue<T>(
        &self,
        operation: &str,
        name: &str,
        f: impl FnOnce(&mut QueueState) -> T,
    ) -> Result<T, ControlError> {
        self.call(operation, name, |state| {
            state
                .queues
                .get_mut(name)
                .map(f)
                .ok_or_else(|| ControlError::not_found("Queue", name))
        })
    }
}

impl BrokerControl for EmbeddedBroker {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_started(&self) -> bool {
        self.state.lock().started
    }

    fn is_active(&self) -> bool {
        let state = self.state.lock();
        state.started && state.active
    }

    fn version(&self) -> String {
        EMBEDDED_VERSION.to_string()
    }

    fn journal_type(&self) -> String {
        self.state.lock().journal_type.clone()
    }

    fn create_divert(&self, divert: &DivertConfiguration) -> Result<(), ControlError> {
        self.call("create_divert", &divert.name, |state| {
            if state.diverts.contains_key(&divert.name) {
                return Err(ControlError::already_exists("Divert", &divert.name));
            }
            state.diverts.insert(divert.name.clone(), divert.clone());
            Ok(())
        })
    }

    fn destroy_divert(&self, name: &str) -> Result<(), ControlError> {
        self.call("destroy_divert", name, |state| {
            state
                .diverts
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ControlError::not_found("Divert", name))
        })
    }

    fn deploy_bridge(&self, bridge: &BridgeConfiguration) -> Result<(), ControlError> {
        self.call("deploy_bridge", &bridge.name, |state| {
            if state.bridges.contains_key(&bridge.name) {
                return Err(ControlError::already_exists("Bridge", &bridge.name));
            }
            state.bridges.insert(bridge.name.clone(), bridge.clone());
            Ok(())
        })
    }

    fn destroy_bridge(&self, name: &str) -> Result<(), ControlError> {
        self.call("destroy_bridge", name, |state| {
            state
                .bridges
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ControlError::not_found("Bridge", name))
        })
    }

    fn deploy_queue(&self, queue: &QueueConfiguration) -> Result<(), ControlError> {
        self.call("deploy_queue", &queue.name, |state| {
            if state.queues.contains_key(&queue.name) {
                return Err(ControlError::already_exists("Queue", &queue.name));
            }
            state
                .queues
                .insert(queue.name.clone(), QueueState::new(queue.clone()));
            Ok(())
        })
    }

    fn destroy_queue(&self, name: &str) -> Result<(), ControlError> {
        self.call("destroy_queue", name, |state| {
            state
                .queues
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ControlError::not_found("Queue", name))
        })
    }

    fn message_counter_sample_period(&self) -> i64 {
        self.state.lock().sample_period
    }

    fn set_message_counter_sample_period(&self, period: i64) -> Result<(), ControlError> {
        self.call("set_message_counter_sample_period", period, |state| {
            state.sample_period = period;
            Ok(())
        })
    }

    fn message_counter_max_day_count(&self) -> i32 {
        self.state.lock().max_day_count
    }

    fn set_message_counter_max_day_count(&self, count: i32) -> Result<(), ControlError> {
        self.call("set_message_counter_max_day_count", count, |state| {
            state.max_day_count = count;
            Ok(())
        })
    }

    fn is_message_counter_enabled(&self) -> bool {
        self.state.lock().counters_enabled
    }

    fn enable_message_counters(&self) -> Result<(), ControlError> {
        self.call("enable_message_counters", "", |state| {
            state.counters_enabled = true;
            Ok(())
        })
    }

    fn disable_message_counters(&self) -> Result<(), ControlError> {
        self.call("disable_message_counters", "", |state| {
            state.counters_enabled = false;
            Ok(())
        })
    }

    fn reset_all_message_counters(&self) -> Result<(), ControlError> {
        self.call("reset_all_message_counters", "", |state| {
            for queue in state.queues.values_mut() {
                queue.messages_added = 0;
            }
            Ok(())
        })
    }

    fn reset_all_message_counter_histories(&self) -> Result<(), ControlError> {
        self.call("reset_all_message_counter_histories", "", |_| Ok(()))
    }

    fn address_settings_match(&self, pattern: &str) -> Option<AddressSettings> {
        self.state.lock().settings.get(pattern).cloned()
    }

    fn add_address_settings_match(
        &self,
        pattern: &str,
        settings: AddressSettings,
    ) -> Result<(), ControlError> {
        self.call("add_address_settings_match", pattern, |state| {
            state.settings.insert(pattern.to_string(), settings);
            Ok(())
        })
    }

    fn remove_address_settings_match(&self, pattern: &str) -> Result<(), ControlError> {
        self.call("remove_address_settings_match", pattern, |state| {
            state.settings.remove(pattern);
            Ok(())
        })
    }

    fn security_match(&self, pattern: &str) -> Option<BTreeSet<Role>> {
        self.state.lock().security.get(pattern).cloned()
    }

    fn add_security_match(&self, pattern: &str, roles: BTreeSet<Role>) -> Result<(), ControlError> {
        self.call("add_security_match", pattern, |state| {
            state.security.insert(pattern.to_string(), roles);
            Ok(())
        })
    }

    fn remove_security_match(&self, pattern: &str) -> Result<(), ControlError> {
        self.call("remove_security_match", pattern, |state| {
            state.security.remove(pattern);
            Ok(())
        })
    }

    fn list_connection_ids(&self) -> Vec<String> {
        self.state.lock().connections.clone()
    }

    fn connectors(&self) -> Vec<TransportConfiguration> {
        self.state.lock().connectors.clone()
    }

    fn queue_names(&self) -> Vec<String> {
        self.state.lock().queues.keys().cloned().collect()
    }

    fn queue(&self, name: &str) -> Option<QueueStatus> {
        self.state.lock().queues.get(name).map(QueueState::status)
    }

    fn pause_queue(&self, name: &str) -> Result<(), ControlError> {
        self.with_queue("pause_queue", name, |q| q.paused = true)
    }

    fn resume_queue(&self, name: &str) -> Result<(), ControlError> {
        self.with_queue("resume_queue", name, |q| q.paused = false)
    }

    fn count_messages(&self, name: &str, filter: Option<&str>) -> Result<i64, ControlError> {
        // Message bodies are not kept, so a filter matches nothing.
        self.with_queue("count_messages", name, |q| match filter {
            Some(f) if !f.is_empty() => 0,
            _ => q.message_count,
        })
    }

    fn reset_message_counter(&self, name: &str) -> Result<(), ControlError> {
        self.with_queue("reset_message_counter", name, |q| q.messages_added = 0)
    }

    fn force_failover(&self) -> Result<(), ControlError> {
        self.call("force_failover", "", |state| {
            if !state.started {
                return Err(ControlError::NotStarted);
            }
            state.started = false;
            Ok(())
        })
    }

    fn start(&self) -> Result<(), ControlError> {
        self.call("start", "", |state| {
            state.started = true;
            Ok(())
        })
    }

    fn stop(&self) -> Result<(), ControlError> {
        self.call("stop", "", |state| {
            state.started = false;
            Ok(())
        })
    }
}

/// Factory keeping track of every embedded broker it created.
#[derive(Debug, Default)]
pub struct EmbeddedBrokerFactory {
    brokers: RwLock<BTreeMap<String, Arc<EmbeddedBroker>>>,
    created: Mutex<u64>,
}

impl EmbeddedBrokerFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created broker with the given name.
    pub fn broker(&self, name: &str) -> Option<Arc<EmbeddedBroker>> {
        self.brokers.read().get(name).cloned()
    }

    /// Number of brokers created so far.
    pub fn created(&self) -> u64 {
        *self.created.lock()
    }
}

impl BrokerFactory for EmbeddedBrokerFactory {
    fn create(
        &self,
        configuration: BrokerConfiguration,
        backup: bool,
    ) -> Result<Arc<dyn BrokerControl>, ControlError> {
        let name = configuration.name.clone();
        let broker = Arc::new(EmbeddedBroker::new(configuration, backup));
        self.brokers.write().insert(name.clone(), broker.clone());
        *self.created.lock() += 1;
        tracing::debug!("Created embedded broker '{}' (backup: {})", name, backup);
        Ok(broker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(name: &str) -> QueueConfiguration {
        QueueConfiguration {
            name: name.to_string(),
            address: name.to_string(),
            filter: None,
            durable: true,
            routing_type: "ANYCAST".to_string(),
        }
    }

    #[test]
    fn test_bootstrap_state_from_configuration() {
        let mut config = BrokerConfiguration::named("default");
        config.queues.push(queue("q1"));
        config.message_counter_sample_period = 5000;
        let broker = EmbeddedBroker::new(config, false);

        assert!(broker.is_started());
        assert!(broker.is_active());
        assert_eq!(broker.queue_names(), vec!["q1"]);
        assert_eq!(broker.message_counter_sample_period(), 5000);
        assert!(broker.calls().is_empty());
    }

    #[test]
    fn test_backup_is_passive() {
        let broker = EmbeddedBroker::new(BrokerConfiguration::named("backup"), true);
        assert!(broker.is_started());
        assert!(!broker.is_active());
        broker.set_active(true);
        assert!(broker.is_active());
    }

    #[test]
    fn test_calls_recorded_and_failure_injected_once() {
        let broker = EmbeddedBroker::new(BrokerConfiguration::named("default"), false);
        broker.fail_next("deploy_queue");
        assert!(matches!(
            broker.deploy_queue(&queue("q1")),
            Err(ControlError::Failed(_))
        ));
        broker.deploy_queue(&queue("q1")).expect("second call succeeds");
        assert_eq!(broker.calls(), vec!["deploy_queue(q1)", "deploy_queue(q1)"]);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let broker = EmbeddedBroker::new(BrokerConfiguration::named("default"), false);
        broker.deploy_queue(&queue("q1")).expect("deploy");
        assert!(matches!(
            broker.deploy_queue(&queue("q1")),
            Err(ControlError::AlreadyExists { .. })
        ));
        assert!(matches!(
            broker.destroy_divert("nope"),
            Err(ControlError::NotFound { .. })
        ));
    }

    #[test]
    fn test_queue_metrics() {
        let broker = EmbeddedBroker::new(BrokerConfiguration::named("default"), false);
        broker.deploy_queue(&queue("q1")).expect("deploy");
        broker.send("q1", 3).expect("send");
        let status = broker.queue("q1").expect("queue");
        assert_eq!(status.message_count, 3);
        assert_eq!(status.messages_added, 3);
        assert_eq!(broker.count_messages("q1", None).expect("count"), 3);

        broker.reset_message_counter("q1").expect("reset");
        assert_eq!(broker.queue("q1").expect("queue").messages_added, 0);
    }

    #[test]
    fn test_failover_stops_broker() {
        let broker = EmbeddedBroker::new(BrokerConfiguration::named("default"), false);
        broker.force_failover().expect("failover");
        assert!(!broker.is_started());
        assert!(matches!(
            broker.force_failover(),
            Err(ControlError::NotStarted)
        ));
    }

    #[test]
    fn test_factory_tracks_brokers() {
        let factory = EmbeddedBrokerFactory::new();
        factory
            .create(BrokerConfiguration::named("a"), false)
            .expect("create");
        factory
            .create(BrokerConfiguration::named("a"), true)
            .expect("create");
        assert_eq!(factory.created(), 2);
        assert!(!factory.broker("a").expect("tracked").is_active());
    }
}
