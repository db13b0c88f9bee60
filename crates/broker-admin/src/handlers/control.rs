// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Custom runtime operations on servers and queues.

use crate::broker::control::BrokerControl;
use crate::handlers::control_failure;
use crate::model::descriptor::{
    ResourceType, COUNT_MESSAGES, FORCE_FAILOVER, GET_ADDRESS_SETTINGS_AS_JSON,
    GET_CONNECTORS_AS_JSON, GET_ROLES, LIST_CONNECTION_IDS, PAUSE, RESET_ALL_MESSAGE_COUNTERS,
    RESET_ALL_MESSAGE_COUNTER_HISTORIES, RESET_MESSAGE_COUNTER, RESUME,
};
use crate::model::node::resource_type;
use crate::model::PathAddress;
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::Operation;
use crate::service::gate::{BrokerState, ReadGate, WriteGate};
use crate::service::locator::locate_broker;
use serde_json::Value;
use std::sync::Arc;

const ADDRESS_MATCH: &str = "address-match";
const FILTER: &str = "filter";

pub fn schedule_operation(
    ctx: &mut OperationContext<'_>,
    op: Operation,
) -> Result<(), OperationError> {
    ctx.add_step(Stage::Runtime, move |ctx| {
        let result = execute(ctx, &op)?;
        ctx.set_result(result);
        Ok(())
    });
    Ok(())
}

fn execute(ctx: &mut OperationContext<'_>, op: &Operation) -> Result<Value, OperationError> {
    let address = &op.address;
    let kind = resource_type(address)?;
    if kind != ResourceType::RuntimeQueue {
        ctx.model().read(address)?;
    }
    if ctx.gate().state(address) == BrokerState::Absent {
        return Err(OperationError::BrokerNotInstalled(locate_broker(address)));
    }

    match kind {
        ResourceType::Server => server_operation(ctx, op),
        ResourceType::Queue | ResourceType::JmsQueue | ResourceType::RuntimeQueue => {
            queue_operation(ctx, op)
        }
        _ => Err(OperationError::unsupported(&op.name, address)),
    }
}

/// Broker for a mutating call.
fn writable(
    ctx: &OperationContext<'_>,
    address: &PathAddress,
) -> Result<Arc<dyn BrokerControl>, OperationError> {
    match ctx.gate().gate_write(address) {
        WriteGate::Proceed(broker) => Ok(broker),
        WriteGate::RollbackWith(reason) => Err(OperationError::StandbyRejection(reason.to_string())),
        WriteGate::Defer => Err(OperationError::InvalidState(format!(
            "broker for {} is not started",
            address
        ))),
    }
}

fn readable(ctx: &OperationContext<'_>, address: &PathAddress) -> Option<Arc<dyn BrokerControl>> {
    match ctx.gate().gate_read(address) {
        ReadGate::Proceed(broker) => Some(broker),
        ReadGate::Undefined => None,
    }
}

fn to_json_string<T: serde::Serialize>(value: &T) -> Result<Value, OperationError> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|e| OperationError::InternalConsistency(e.to_string()))
}

fn server_operation(ctx: &mut OperationContext<'_>, op: &Operation) -> Result<Value, OperationError> {
    let address = &op.address;
    match op.name.as_str() {
        RESET_ALL_MESSAGE_COUNTERS => {
            writable(ctx, address)?
                .reset_all_message_counters()
                .map_err(OperationError::from)
                .map_err(control_failure(&op.name, address))?;
            Ok(Value::Null)
        }
        RESET_ALL_MESSAGE_COUNTER_HISTORIES => {
            writable(ctx, address)?
                .reset_all_message_counter_histories()
                .map_err(OperationError::from)
                .map_err(control_failure(&op.name, address))?;
            Ok(Value::Null)
        }
        FORCE_FAILOVER => {
            let broker = writable(ctx, address)?;
            broker
                .force_failover()
                .map_err(OperationError::from)
                .map_err(control_failure(&op.name, address))?;
            tracing::info!("Forced failover of broker '{}'", broker.name());
            Ok(Value::Null)
        }
        LIST_CONNECTION_IDS => Ok(match readable(ctx, address) {
            Some(broker) => Value::from(broker.list_connection_ids()),
            None => Value::Null,
        }),
        GET_CONNECTORS_AS_JSON => match readable(ctx, address) {
            Some(broker) => to_json_string(&broker.connectors()),
            None => Ok(Value::Null),
        },
        GET_ROLES => {
            let pattern = op.param_str(ADDRESS_MATCH)?;
            match readable(ctx, address) {
                Some(broker) => serde_json::to_value(broker.security_match(pattern).unwrap_or_default())
                    .map_err(|e| OperationError::InternalConsistency(e.to_string())),
                None => Ok(Value::Null),
            }
        }
        GET_ADDRESS_SETTINGS_AS_JSON => {
            let pattern = op.param_str(ADDRESS_MATCH)?;
            match readable(ctx, address).and_then(|b| b.address_settings_match(pattern)) {
                Some(settings) => to_json_string(&settings),
                None => Ok(Value::Null),
            }
        }
        _ => Err(OperationError::unsupported(&op.name, address)),
    }
}

fn queue_operation(ctx: &mut OperationContext<'_>, op: &Operation) -> Result<Value, OperationError> {
    let address = &op.address;
    let queue = address.last_value().to_string();
    let missing = |broker: &dyn BrokerControl| {
        OperationError::NotFound(format!("queue '{}' on broker '{}'", queue, broker.name()))
    };

    match op.name.as_str() {
        PAUSE | RESUME => {
            let broker = writable(ctx, address)?;
            let status = broker.queue(&queue).ok_or_else(|| missing(broker.as_ref()))?;
            let pause = op.name == PAUSE;
            if status.paused == pause {
                return Ok(Value::Null);
            }
            set_paused(broker.as_ref(), &queue, pause)
                .map_err(control_failure(&op.name, address))?;
            ctx.register_revert(move |_| set_paused(broker.as_ref(), &queue, !pause));
            Ok(Value::Null)
        }
        RESET_MESSAGE_COUNTER => {
            let broker = writable(ctx, address)?;
            if broker.queue(&queue).is_none() {
                return Err(missing(broker.as_ref()));
            }
            broker
                .reset_message_counter(&queue)
                .map_err(OperationError::from)
                .map_err(control_failure(&op.name, address))?;
            Ok(Value::Null)
        }
        COUNT_MESSAGES => {
            let filter = op.param(FILTER).and_then(Value::as_str);
            match readable(ctx, address) {
                Some(broker) => {
                    if broker.queue(&queue).is_none() {
                        return Err(missing(broker.as_ref()));
                    }
                    Ok(Value::from(broker.count_messages(&queue, filter)?))
                }
                None => Ok(Value::Null),
            }
        }
        _ => Err(OperationError::unsupported(&op.name, address)),
    }
}

fn set_paused(broker: &dyn BrokerControl, queue: &str, pause: bool) -> Result<(), OperationError> {
    if pause {
        broker.pause_queue(queue)?;
    } else {
        broker.resume_queue(queue)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::configuration::{BrokerConfiguration, QueueConfiguration};
    use crate::broker::embedded::{EmbeddedBroker, EmbeddedBrokerFactory};
    use crate::model::{ExpressionResolver, ResourceModel};
    use crate::operation::context::RuntimeSupport;
    use crate::service::name::ServiceName;
    use crate::service::registry::{ServiceRegistry, ServiceState, ServiceValue};
    use serde_json::json;
    use std::collections::BTreeMap;

    struct Fixture {
        model: ResourceModel,
        registry: ServiceRegistry,
        support: RuntimeSupport,
    }

    impl Fixture {
        fn new() -> Self {
            let mut model = ResourceModel::new();
            model
                .add(&PathAddress::server("default"), BTreeMap::new())
                .expect("server");
            Self {
                model,
                registry: ServiceRegistry::new(),
                support: RuntimeSupport::new(
                    ExpressionResolver::default(),
                    Arc::new(EmbeddedBrokerFactory::new()),
                ),
            }
        }

        fn install(&self, backup: bool) -> Arc<EmbeddedBroker> {
            let mut config = BrokerConfiguration::named("default");
            config.queues.push(QueueConfiguration {
                name: "q".into(),
                address: "q".into(),
                filter: None,
                durable: true,
                routing_type: "ANYCAST".into(),
            });
            let broker = Arc::new(EmbeddedBroker::new(config, backup));
            self.registry
                .install(
                    ServiceName::broker("default"),
                    ServiceValue::Broker(broker.clone()),
                    ServiceState::Up,
                )
                .expect("install");
            broker
        }

        fn run(&mut self, op: Operation) -> crate::operation::op::OperationResult {
            let mut ctx = OperationContext::new(&mut self.model, &self.registry, &self.support, false);
            schedule_operation(&mut ctx, op).expect("schedule");
            ctx.run()
        }
    }

    #[test]
    fn test_absent_broker() {
        let mut f = Fixture::new();
        let result = f.run(Operation::new(LIST_CONNECTION_IDS, PathAddress::server("default")));
        assert!(matches!(
            result.error,
            Some(OperationError::BrokerNotInstalled(_))
        ));
    }

    #[test]
    fn test_list_connections_and_standby() {
        let mut f = Fixture::new();
        let broker = f.install(false);
        broker.open_connection("c1");
        let result = f.run(Operation::new(LIST_CONNECTION_IDS, PathAddress::server("default")));
        assert_eq!(result.result, json!(["c1"]));

        broker.set_active(false);
        let result = f.run(Operation::new(LIST_CONNECTION_IDS, PathAddress::server("default")));
        assert!(result.is_success());
        assert_eq!(result.result, Value::Null);

        let result = f.run(Operation::new(
            RESET_ALL_MESSAGE_COUNTERS,
            PathAddress::server("default"),
        ));
        assert!(matches!(
            result.error,
            Some(OperationError::StandbyRejection(_))
        ));
    }

    #[test]
    fn test_pause_runtime_queue() {
        let mut f = Fixture::new();
        let broker = f.install(false);
        let queue = PathAddress::server("default").append("runtime-queue", "q");
        assert!(f.run(Operation::new(PAUSE, queue.clone())).is_success());
        assert!(broker.queue("q").expect("queue").paused);
        assert!(f.run(Operation::new(RESUME, queue)).is_success());
        assert!(!broker.queue("q").expect("queue").paused);
    }

    #[test]
    fn test_count_messages() {
        let mut f = Fixture::new();
        let broker = f.install(false);
        broker.send("q", 4).expect("send");
        let queue = PathAddress::server("default").append("runtime-queue", "q");
        let result = f.run(Operation::new(COUNT_MESSAGES, queue));
        assert_eq!(result.result, json!(4));
    }

    #[test]
    fn test_unknown_runtime_queue() {
        let mut f = Fixture::new();
        f.install(false);
        let queue = PathAddress::server("default").append("runtime-queue", "nope");
        let result = f.run(Operation::new(PAUSE, queue));
        assert!(matches!(result.error, Some(OperationError::NotFound(_))));
    }
}
