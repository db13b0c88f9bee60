// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Configuration/runtime synchronization integration tests
//!
//! Drives the subsystem end to end against in-memory brokers.

use broker_admin::broker::configuration::QueueConfiguration;
use broker_admin::broker::{BrokerControl, EmbeddedBroker, EmbeddedBrokerFactory};
use broker_admin::model::{correct_address, ExpressionResolver};
use broker_admin::operation::{OperationContext, RuntimeSupport, Stage};
use broker_admin::service::{ServiceName, ServiceRegistry};
use broker_admin::{
    handlers, BrokerState, Operation, OperationError, PathAddress, ResourceModel, Subsystem,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn subsystem() -> (Subsystem, Arc<EmbeddedBrokerFactory>) {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    (Subsystem::new(support).expect("subsystem"), factory)
}

fn server() -> PathAddress {
    PathAddress::server("default")
}

fn embedded(factory: &EmbeddedBrokerFactory) -> Arc<EmbeddedBroker> {
    factory.broker("default").expect("broker created")
}

fn children() -> Vec<Operation> {
    let server = server();
    vec![
        Operation::add(
            server.append("queue", "orders"),
            json!({"queue-address": "jms.queue.orders", "routing-type": "ANYCAST"}),
        ),
        Operation::add(
            server.append("divert", "audit"),
            json!({"divert-address": "orders", "forwarding-address": "audit", "exclusive": true}),
        ),
        Operation::add(
            server.append("address-setting", "orders.#"),
            json!({"max-delivery-attempts": 3, "address-full-policy": "BLOCK"}),
        ),
        Operation::add(server.append("security-setting", "#"), json!({})),
        Operation::add(
            server.append("security-setting", "#").append("role", "guest"),
            json!({"send": true, "consume": true}),
        ),
    ]
}

// ============================================================================
// Address correction
// ============================================================================

#[test]
fn test_correction_is_idempotent() {
    for input in [
        "",
        "jms",
        "jms.queue.",
        "jms.queue.jms",
        "jms.topic.jms.queue.news",
        "orders",
        "jms.queuex",
    ] {
        let once = correct_address(input);
        assert_eq!(correct_address(&once), once, "input {:?}", input);
    }

    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let queue = server().append("queue", "orders");
    let result = subsystem.execute(Operation::add(
        queue.clone(),
        json!({"queue-address": "jms.queue.orders"}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);
    let stored = subsystem
        .execute(Operation::read_attribute(queue, "queue-address"))
        .result;
    assert_eq!(stored, json!("orders"));
}

// ============================================================================
// Defer-then-bootstrap equivalence
// ============================================================================

#[test]
fn test_boot_and_live_adds_converge() {
    let (mut booted, booted_factory) = subsystem();
    let mut batch = vec![Operation::add(server(), json!({"statistics-enabled": true}))];
    batch.extend(children());
    booted.boot(batch).expect("boot");

    let (mut live, live_factory) = subsystem();
    let result = live.execute(Operation::add(server(), json!({"statistics-enabled": true})));
    assert!(result.is_success());
    for op in children() {
        let result = live.execute(op);
        assert!(result.is_success(), "{:?}", result.failure_description);
    }

    let from_boot = embedded(&booted_factory);
    let from_live = embedded(&live_factory);
    assert_eq!(from_boot.snapshot(), from_live.snapshot());

    // Boot consumed everything in one bootstrap call.
    assert!(from_boot.calls().is_empty());
    assert!(from_live.calls().contains(&"deploy_queue(orders)".to_string()));
    assert!(from_live.calls().contains(&"create_divert(audit)".to_string()));
}

#[test]
fn test_children_added_while_absent_reach_bootstrap() {
    let (mut subsystem, factory) = subsystem();
    let mut batch = vec![Operation::add(server(), json!({}))];
    batch.extend(children());
    subsystem.boot(batch).expect("boot");

    let broker = embedded(&factory);
    assert_eq!(factory.created(), 1);
    let snapshot = broker.snapshot();
    assert!(snapshot.queues.contains_key("orders"));
    assert!(snapshot.diverts.contains_key("audit"));
    assert!(snapshot.address_settings.contains_key("orders.#"));
    assert_eq!(snapshot.security_settings.get("#").map(|r| r.len()), Some(1));
}

// ============================================================================
// Generic group forwarding
// ============================================================================

fn group_binding(kind: &str, name: &str) -> ServiceName {
    ServiceName::broker("default").append(kind).append(name)
}

#[test]
fn test_generic_group_add_takes_one_path() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));

    let result = subsystem.execute(Operation::add(
        server().append("broadcast-group", "bg-jgroups"),
        json!({"jgroups-cluster": "activemq-cluster", "jgroups-channel": "ee"}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);
    let result = subsystem.execute(Operation::add(
        server().append("broadcast-group", "bg-socket"),
        json!({"socket-binding": "messaging-group"}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);

    let registry = subsystem.registry();
    assert!(registry.contains(&group_binding("jgroups-broadcast-group", "bg-jgroups")));
    assert!(!registry.contains(&group_binding("socket-broadcast-group", "bg-jgroups")));
    assert!(registry.contains(&group_binding("socket-broadcast-group", "bg-socket")));
    assert!(!registry.contains(&group_binding("jgroups-broadcast-group", "bg-socket")));

    let model = subsystem.model();
    assert!(model.contains(&server().append("jgroups-broadcast-group", "bg-jgroups")));
    assert!(!model.contains(&server().append("broadcast-group", "bg-jgroups")));
    assert!(subsystem.is_reload_required());
}

#[test]
fn test_generic_group_remove_uses_existing_shape() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    subsystem.execute(Operation::add(
        server().append("broadcast-group", "bg"),
        json!({"jgroups-cluster": "activemq-cluster"}),
    ));

    let services_before = subsystem.registry().len();
    let result = subsystem.execute(Operation::remove(server().append("broadcast-group", "bg")));
    assert!(result.is_success(), "{:?}", result.failure_description);
    assert_eq!(subsystem.registry().len(), services_before - 1);
    assert!(!subsystem
        .model()
        .contains(&server().append("jgroups-broadcast-group", "bg")));

    let result = subsystem.execute(Operation::remove(server().append("broadcast-group", "bg")));
    assert!(matches!(result.error, Some(OperationError::NotFound(_))));
}

#[test]
fn test_generic_group_read_through_concrete() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    subsystem.execute(Operation::add(
        server().append("discovery-group", "dg"),
        json!({"socket-binding": "messaging-group", "refresh-timeout": 5000}),
    ));

    let generic = server().append("discovery-group", "dg");
    let result = subsystem.execute(Operation::read_attribute(generic.clone(), "refresh-timeout"));
    assert_eq!(result.result, json!(5000));
    let result = subsystem.execute(Operation::read_attribute(generic, "jgroups-cluster"));
    assert!(result.is_success());
    assert_eq!(result.result, Value::Null);
}

#[test]
fn test_group_name_holds_one_shape() {
    let (mut subsystem, factory) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let socket = server().append("socket-broadcast-group", "bg");
    let result = subsystem.execute(Operation::add(
        socket.clone(),
        json!({"socket-binding": "messaging-group"}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);

    let result = subsystem.execute(Operation::add(
        server().append("broadcast-group", "bg"),
        json!({"jgroups-cluster": "activemq-cluster"}),
    ));
    assert!(matches!(result.error, Some(OperationError::Duplicate(_))));
    let result = subsystem.execute(Operation::add(
        server().append("jgroups-broadcast-group", "bg"),
        json!({"jgroups-cluster": "activemq-cluster"}),
    ));
    assert!(matches!(result.error, Some(OperationError::Duplicate(_))));
    assert!(!subsystem
        .model()
        .contains(&server().append("jgroups-broadcast-group", "bg")));
    assert!(!subsystem
        .registry()
        .contains(&group_binding("jgroups-broadcast-group", "bg")));

    subsystem.reload().expect("reload");
    assert_eq!(embedded(&factory).configuration().broadcast_groups.len(), 1);

    let result = subsystem.execute(Operation::remove(server().append("broadcast-group", "bg")));
    assert!(result.is_success(), "{:?}", result.failure_description);
    assert!(!subsystem.model().contains(&socket));
}

#[test]
fn test_discovery_group_name_holds_one_shape() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let result = subsystem.execute(Operation::add(
        server().append("jgroups-discovery-group", "dg"),
        json!({"jgroups-cluster": "activemq-cluster"}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);

    let result = subsystem.execute(Operation::add(
        server().append("discovery-group", "dg"),
        json!({"socket-binding": "messaging-group"}),
    ));
    assert!(matches!(result.error, Some(OperationError::Duplicate(_))));
    assert!(!subsystem
        .model()
        .contains(&server().append("socket-discovery-group", "dg")));
}

// ============================================================================
// Standby behaviour
// ============================================================================

#[test]
fn test_reads_on_passive_broker_succeed_undefined() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    support.backup_servers.insert("default".to_string());
    let mut subsystem = Subsystem::new(support).expect("subsystem");
    subsystem.execute(Operation::add(server(), json!({})));
    assert_eq!(subsystem.state(&server()), BrokerState::UpPassive);

    let reads = vec![
        Operation::read_attribute(server(), "version"),
        Operation::read_attribute(server(), "runtime-journal-type"),
        Operation::read_attribute(server().append("runtime-queue", "anything"), "message-count"),
        Operation::new("list-connection-ids", server()),
        Operation::new("get-roles", server()).with_param("address-match", "#"),
    ];
    for op in reads {
        let name = op.name.clone();
        let result = subsystem.execute(op);
        assert!(result.is_success(), "{}: {:?}", name, result.failure_description);
        assert_eq!(result.result, Value::Null, "{}", name);
    }

    let result = subsystem.execute(Operation::read_attribute(server(), "active"));
    assert_eq!(result.result, json!(false));
}

#[test]
fn test_live_add_on_passive_broker_is_rejected() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    support.backup_servers.insert("default".to_string());
    let mut subsystem = Subsystem::new(support).expect("subsystem");
    subsystem.execute(Operation::add(server(), json!({})));

    let divert = server().append("divert", "d");
    let result = subsystem.execute(Operation::add(
        divert.clone(),
        json!({"divert-address": "a", "forwarding-address": "b"}),
    ));
    assert!(matches!(
        result.error,
        Some(OperationError::StandbyRejection(_))
    ));
    assert!(!subsystem.model().contains(&divert));
    assert!(embedded(&factory).calls().is_empty());
}

// ============================================================================
// Message counter sample period
// ============================================================================

#[test]
fn test_sample_period_write_active_and_passive() {
    let (mut active, factory) = subsystem();
    active.execute(Operation::add(server(), json!({})));
    let result = active.execute(Operation::write_attribute(
        server(),
        "message-counter-sample-period",
        2000,
    ));
    assert!(result.is_success());
    assert_eq!(
        embedded(&factory).calls(),
        vec!["set_message_counter_sample_period(2000)".to_string()]
    );

    let backup_factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut support = RuntimeSupport::new(ExpressionResolver::default(), backup_factory.clone());
    support.backup_servers.insert("default".to_string());
    let mut passive = Subsystem::new(support).expect("subsystem");
    passive.execute(Operation::add(server(), json!({})));
    let result = passive.execute(Operation::write_attribute(
        server(),
        "message-counter-sample-period",
        2000,
    ));
    assert!(result.is_success());
    assert!(embedded(&backup_factory).calls().is_empty());
    let stored = passive
        .execute(Operation::read_attribute(server(), "message-counter-sample-period"))
        .result;
    assert_eq!(stored, json!(2000));
}

#[test]
fn test_sample_period_expression_resolved() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut resolver = ExpressionResolver::default();
    resolver.set_property("period", "3000");
    let mut subsystem =
        Subsystem::new(RuntimeSupport::new(resolver, factory.clone())).expect("subsystem");
    subsystem.execute(Operation::add(server(), json!({})));

    let result = subsystem.execute(Operation::write_attribute(
        server(),
        "message-counter-sample-period",
        "${period:1000}",
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);
    assert_eq!(embedded(&factory).message_counter_sample_period(), 3000);
}

#[test]
fn test_live_remove_on_passive_broker_is_rejected() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    support.backup_servers.insert("default".to_string());
    let mut subsystem = Subsystem::new(support).expect("subsystem");
    let divert = server().append("divert", "d");
    subsystem
        .boot(vec![
            Operation::add(server(), json!({})),
            Operation::add(
                divert.clone(),
                json!({"divert-address": "a", "forwarding-address": "b"}),
            ),
        ])
        .expect("boot");
    assert_eq!(subsystem.state(&server()), BrokerState::UpPassive);
    let model_before = subsystem.model().clone();

    let result = subsystem.execute(Operation::remove(divert.clone()));
    assert!(matches!(
        result.error,
        Some(OperationError::StandbyRejection(_))
    ));
    assert!(subsystem.model().contains(&divert));
    assert_eq!(subsystem.model(), &model_before);
    assert!(embedded(&factory).calls().is_empty());
}

// ============================================================================
// Rollback
// ============================================================================

#[test]
fn test_live_write_rollback_restores_settings() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    let registry = ServiceRegistry::new();
    let mut model = ResourceModel::new();
    let setting = server().append("address-setting", "orders.#");

    let mut ctx = OperationContext::new(&mut model, &registry, &support, true);
    for op in [
        Operation::add(server(), json!({})),
        Operation::add(setting.clone(), json!({"max-delivery-attempts": 3})),
    ] {
        handlers::schedule(&mut ctx, op).expect("schedule");
    }
    assert!(ctx.run().is_success());

    let broker = embedded(&factory);
    let before = broker.snapshot().address_settings;
    let model_before = model.clone();

    let mut ctx = OperationContext::new(&mut model, &registry, &support, false);
    handlers::schedule(
        &mut ctx,
        Operation::write_attribute(setting, "max-delivery-attempts", 7),
    )
    .expect("schedule");
    ctx.add_step(Stage::Verify, |_| {
        Err(OperationError::InvalidState("verification failed".into()))
    });
    let result = ctx.run();

    assert!(!result.is_success());
    assert_eq!(broker.snapshot().address_settings, before);
    assert_eq!(model, model_before);
}

#[test]
fn test_live_remove_rollback_recovers_resources() {
    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let support = RuntimeSupport::new(ExpressionResolver::default(), factory.clone());
    let registry = ServiceRegistry::new();
    let mut model = ResourceModel::new();
    let divert = server().append("divert", "d");
    let queue = server().append("queue", "q");

    let mut ctx = OperationContext::new(&mut model, &registry, &support, true);
    for op in [
        Operation::add(server(), json!({})),
        Operation::add(queue.clone(), json!({"queue-address": "q"})),
        Operation::add(
            divert.clone(),
            json!({"divert-address": "q", "forwarding-address": "audit"}),
        ),
    ] {
        handlers::schedule(&mut ctx, op).expect("schedule");
    }
    assert!(ctx.run().is_success());

    let broker = embedded(&factory);
    let before = broker.snapshot();
    let model_before = model.clone();

    let mut ctx = OperationContext::new(&mut model, &registry, &support, false);
    handlers::schedule(&mut ctx, Operation::remove(divert)).expect("schedule");
    handlers::schedule(&mut ctx, Operation::remove(queue)).expect("schedule");
    ctx.add_step(Stage::Verify, |_| {
        Err(OperationError::InvalidState("verification failed".into()))
    });
    let result = ctx.run();

    assert!(!result.is_success());
    let calls = broker.calls();
    for call in [
        "destroy_divert(d)",
        "destroy_queue(q)",
        "create_divert(d)",
        "deploy_queue(q)",
    ] {
        assert!(calls.contains(&call.to_string()), "missing {} in {:?}", call, calls);
    }
    assert_eq!(broker.snapshot(), before);
    assert_eq!(model, model_before);
}

#[test]
fn test_control_failure_reverts_model() {
    let (mut subsystem, factory) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let setting = server().append("address-setting", "#");
    subsystem.execute(Operation::add(setting.clone(), json!({})));

    let broker = embedded(&factory);
    let before = broker.snapshot();
    broker.fail_next("add_address_settings_match");
    let result = subsystem.execute(Operation::write_attribute(
        setting.clone(),
        "max-delivery-attempts",
        1,
    ));

    assert!(matches!(result.error, Some(OperationError::ControlApi(_))));
    assert_eq!(broker.snapshot(), before);
    let stored = subsystem
        .execute(Operation::read_attribute(setting, "max-delivery-attempts"))
        .result;
    assert_eq!(stored, json!(10));
}

#[test]
fn test_failed_restart_write_does_not_flag_reload() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let result = subsystem.execute(Operation::write_attribute(server(), "journal-type", "MAPPED"));
    assert!(matches!(result.error, Some(OperationError::Validation(_))));
    assert!(!subsystem.is_reload_required());
}

// ============================================================================
// Runtime queue redirection
// ============================================================================

#[test]
fn test_unmanaged_queue_redirects_once() {
    let (mut subsystem, factory) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));

    // A queue created on the broker directly, without a managed resource.
    let broker = embedded(&factory);
    broker
        .deploy_queue(&QueueConfiguration {
            name: "native".into(),
            address: "native".into(),
            filter: None,
            durable: false,
            routing_type: "ANYCAST".into(),
        })
        .expect("deploy");
    broker.send("native", 3).expect("send");

    let result = subsystem.execute(Operation::read_attribute(
        server().append("queue", "native"),
        "message-count",
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);
    assert_eq!(result.result, json!(3));

    // A name unknown to both namespaces is reported as not found.
    let result = subsystem.execute(Operation::read_attribute(
        server().append("queue", "typo"),
        "message-count",
    ));
    assert!(matches!(result.error, Some(OperationError::NotFound(_))));
}

// ============================================================================
// Cross-resource warnings
// ============================================================================

#[test]
fn test_missing_dead_letter_queue_warns() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));

    let setting = server().append("address-setting", "#");
    let result = subsystem.execute(Operation::add(
        setting.clone(),
        json!({"dead-letter-address": "jms.queue.DLQ"}),
    ));
    assert!(result.is_success());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("'DLQ'"));

    let result = subsystem.execute(Operation::add(
        server().append("jms-queue", "DLQ"),
        json!({"entries": ["java:/jms/queue/DLQ"]}),
    ));
    assert!(result.is_success(), "{:?}", result.failure_description);
    assert!(result.warnings.is_empty());

    let stored = subsystem
        .execute(Operation::read_attribute(setting, "dead-letter-address"))
        .result;
    assert_eq!(stored, json!("DLQ"));
}

// ============================================================================
// Lifecycle states
// ============================================================================

#[test]
fn test_queue_add_on_stopped_broker_fails() {
    let (mut subsystem, _) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    subsystem.stop_server("default").expect("stop");

    let result = subsystem.execute(Operation::add(
        server().append("queue", "q"),
        json!({"queue-address": "q"}),
    ));
    assert!(matches!(result.error, Some(OperationError::InvalidState(_))));

    // Settings survive the restart through the bootstrap.
    let result = subsystem.execute(Operation::add(
        server().append("address-setting", "#"),
        json!({"max-delivery-attempts": 4}),
    ));
    assert!(result.is_success());
    subsystem.start_server("default").expect("start");
    let broker = subsystem.broker("default").expect("broker");
    let settings = broker.address_settings_match("#").expect("settings");
    assert_eq!(settings.max_delivery_attempts, 4);
}

#[test]
fn test_server_remove_uninstalls_broker() {
    let (mut subsystem, factory) = subsystem();
    subsystem.execute(Operation::add(server(), json!({})));
    let broker = embedded(&factory);

    let result = subsystem.execute(Operation::remove(server()));
    assert!(result.is_success());
    assert_eq!(subsystem.state(&server()), BrokerState::Absent);
    assert!(!broker.is_started());
}
