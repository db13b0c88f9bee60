// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `read-attribute` and `read-resource`.
//!
//! Configuration attributes come from the model. Runtime attributes go
//! through the lifecycle gate and are undefined, not failed, when the broker
//! is not active.

use crate::broker::control::{BrokerControl, QueueStatus};
use crate::model::descriptor::ResourceType;
use crate::model::node::resource_type;
use crate::model::validate::ValidationError;
use crate::model::{ConfigNode, PathAddress};
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::{Operation, INCLUDE_RUNTIME, NAME, RECURSIVE};
use crate::service::gate::{BrokerState, LifecycleGate, ReadGate};
use serde_json::{Map, Value};

pub fn schedule_read_attribute(
    ctx: &mut OperationContext<'_>,
    op: Operation,
) -> Result<(), OperationError> {
    let name = op.param_str(NAME)?.to_string();
    let address = op.address;
    ctx.add_step(Stage::Model, move |ctx| {
        let value = read_attribute(ctx, &address, &name)?;
        ctx.set_result(value);
        Ok(())
    });
    Ok(())
}

pub fn schedule_read_resource(
    ctx: &mut OperationContext<'_>,
    op: Operation,
) -> Result<(), OperationError> {
    let recursive = op.flag(RECURSIVE);
    let include_runtime = op.flag(INCLUDE_RUNTIME);
    let address = op.address;
    ctx.add_step(Stage::Model, move |ctx| {
        let value = read_resource(ctx, &address, recursive, include_runtime)?;
        ctx.set_result(value);
        Ok(())
    });
    Ok(())
}

/// Value of one attribute.
pub fn read_attribute(
    ctx: &OperationContext<'_>,
    address: &PathAddress,
    name: &str,
) -> Result<Value, OperationError> {
    let kind = resource_type(address)?;
    let attr = kind
        .descriptor()
        .attribute(name)
        .ok_or_else(|| ValidationError::UndeclaredAttribute {
            resource: kind,
            attribute: name.to_string(),
        })?;

    if kind == ResourceType::RuntimeQueue {
        return Ok(match runtime_queue(ctx.gate(), address)? {
            Some(status) => queue_attribute(&status, name),
            None => Value::Null,
        });
    }

    let node = ctx.model().read(address)?;
    if attr.is_runtime() {
        runtime_attribute(ctx.gate(), node, address, name)
    } else {
        Ok(node.attribute_or_default(name).unwrap_or(Value::Null))
    }
}

/// Attributes and children of a resource.
pub fn read_resource(
    ctx: &OperationContext<'_>,
    address: &PathAddress,
    recursive: bool,
    include_runtime: bool,
) -> Result<Value, OperationError> {
    if resource_type(address)? == ResourceType::RuntimeQueue {
        return Ok(match runtime_queue(ctx.gate(), address)? {
            Some(status) => describe_runtime_queue(&status),
            None => Value::Null,
        });
    }
    let node = ctx.model().read(address)?;
    describe(ctx.gate(), node, address, recursive, include_runtime)
}

fn describe(
    gate: LifecycleGate<'_>,
    node: &ConfigNode,
    address: &PathAddress,
    recursive: bool,
    include_runtime: bool,
) -> Result<Value, OperationError> {
    let descriptor = node.kind().descriptor();
    let mut out = Map::new();
    for attr in descriptor.configuration_attributes() {
        out.insert(
            attr.name.to_string(),
            node.attribute_or_default(attr.name).unwrap_or(Value::Null),
        );
    }
    if include_runtime {
        for attr in descriptor.runtime_attributes() {
            let value = match runtime_attribute(gate, node, address, attr.name) {
                Ok(value) => value,
                // A managed queue not deployed (yet) reads as undefined here.
                Err(OperationError::NotFound(_)) => Value::Null,
                Err(err) => return Err(err),
            };
            out.insert(attr.name.to_string(), value);
        }
    }

    for child in node.children() {
        let child_address = address.append(child.kind().key(), child.name());
        let value = if recursive {
            describe(gate, child, &child_address, recursive, include_runtime)?
        } else {
            Value::Null
        };
        insert_child(&mut out, child.kind().key(), child.name(), value);
    }

    if node.kind() == ResourceType::Server {
        if let Some(broker) = gate.active_broker(address) {
            for name in broker.queue_names() {
                let value = match (recursive, broker.queue(&name)) {
                    (true, Some(status)) => describe_runtime_queue(&status),
                    _ => Value::Null,
                };
                insert_child(&mut out, ResourceType::RuntimeQueue.key(), &name, value);
            }
        }
    }
    Ok(Value::Object(out))
}

fn insert_child(out: &mut Map<String, Value>, key: &str, name: &str, value: Value) {
    if let Value::Object(children) = out
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
    {
        children.insert(name.to_string(), value);
    }
}

fn runtime_attribute(
    gate: LifecycleGate<'_>,
    node: &ConfigNode,
    address: &PathAddress,
    name: &str,
) -> Result<Value, OperationError> {
    match node.kind() {
        ResourceType::Server => Ok(match name {
            "started" => Value::Bool(gate.state(address).is_up()),
            "active" => Value::Bool(gate.state(address) == BrokerState::UpActive),
            _ => match gate.gate_read(address) {
                ReadGate::Proceed(broker) => server_attribute(broker.as_ref(), name),
                ReadGate::Undefined => Value::Null,
            },
        }),
        ResourceType::Queue | ResourceType::JmsQueue => match gate.gate_read(address) {
            ReadGate::Proceed(broker) => {
                let status = deployed_queue(broker.as_ref(), node.name())?;
                Ok(queue_attribute(&status, name))
            }
            ReadGate::Undefined => Ok(Value::Null),
        },
        _ => Ok(Value::Null),
    }
}

fn server_attribute(broker: &dyn BrokerControl, name: &str) -> Value {
    match name {
        "version" => Value::String(broker.version()),
        "runtime-journal-type" => Value::String(broker.journal_type()),
        _ => Value::Null,
    }
}

fn deployed_queue(broker: &dyn BrokerControl, name: &str) -> Result<QueueStatus, OperationError> {
    broker
        .queue(name)
        .ok_or_else(|| OperationError::NotFound(format!("queue '{}' on broker '{}'", name, broker.name())))
}

/// Live status of the queue behind a runtime-queue address; `None` when
/// the broker is not active.
fn runtime_queue(
    gate: LifecycleGate<'_>,
    address: &PathAddress,
) -> Result<Option<QueueStatus>, OperationError> {
    match gate.gate_read(address) {
        ReadGate::Proceed(broker) => deployed_queue(broker.as_ref(), address.last_value()).map(Some),
        ReadGate::Undefined => Ok(None),
    }
}

/// One attribute of a live queue.
pub fn queue_attribute(status: &QueueStatus, name: &str) -> Value {
    match name {
        "message-count" => Value::from(status.message_count),
        "delivering-count" => Value::from(status.delivering_count),
        "messages-added" => Value::from(status.messages_added),
        "consumer-count" => Value::from(status.consumer_count),
        "scheduled-count" => Value::from(status.scheduled_count),
        "paused" => Value::Bool(status.paused),
        "temporary" => Value::Bool(status.temporary),
        "queue-address" => Value::String(status.address.clone()),
        "durable" => Value::Bool(status.durable),
        "filter" => status.filter.clone().map(Value::String).unwrap_or(Value::Null),
        "routing-type" => Value::String(status.routing_type.clone()),
        _ => Value::Null,
    }
}

fn describe_runtime_queue(status: &QueueStatus) -> Value {
    let out: Map<String, Value> = ResourceType::RuntimeQueue
        .descriptor()
        .attributes
        .iter()
        .map(|a| (a.name.to_string(), queue_attribute(status, a.name)))
        .collect();
    Value::Object(out)
}
