// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `add` handling.
//!
//! The model stage validates and stores the node. The runtime stage then
//! depends on the broker: absent means the node waits for the broker's
//! bootstrap, active means the control API is called now, and kinds that
//! only take effect on restart flag a reload instead.

use crate::handlers::control_failure;
use crate::handlers::server;
use crate::legacy;
use crate::handlers::table::{LiveHandlers, LiveTarget, RuntimePolicy, SubService};
use crate::model::descriptor::ResourceType;
use crate::model::node::resource_type;
use crate::model::validate::{resolve_value, validate_and_populate};
use crate::model::PathAddress;
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::{Operation, ADD};
use crate::service::gate::{BrokerState, STANDBY_MESSAGE};
use crate::service::locator::{group_binding, http_upgrade};
use crate::service::registry::{ServiceState, ServiceValue};
use serde_json::{Map, Value};

/// Address-setting attributes naming a queue that should exist.
const QUEUE_REFERENCES: [&str; 2] = ["dead-letter-address", "expiry-address"];

pub fn schedule_add(ctx: &mut OperationContext<'_>, op: Operation) -> Result<(), OperationError> {
    let kind = resource_type(&op.address)?;
    if kind.is_runtime_only() {
        return Err(OperationError::unsupported(ADD, &op.address));
    }
    let Operation {
        address, params, ..
    } = op;
    ctx.add_step(Stage::Model, move |ctx| populate(ctx, kind, &address, &params));
    Ok(())
}

/// Model stage of an add: validate, store, and queue the runtime step.
pub(crate) fn populate(
    ctx: &mut OperationContext<'_>,
    kind: ResourceType,
    address: &PathAddress,
    params: &Map<String, Value>,
) -> Result<(), OperationError> {
    if kind == ResourceType::Subsystem {
        return Err(OperationError::Duplicate(address.to_string()));
    }
    let handlers = ctx.support().handlers.get(kind)?;
    let attributes = validate_and_populate(kind.descriptor(), params, ctx.resolver())?;

    if handlers.unique {
        if let Some(parent) = address.parent() {
            let existing = ctx
                .model()
                .read(&parent)?
                .children_of(kind)
                .next()
                .map(|n| n.name().to_string());
            if let Some(existing) = existing {
                return Err(OperationError::Duplicate(format!(
                    "{} '{}' is already defined on {}",
                    kind, existing, parent
                )));
            }
        }
    }

    if let Some(sibling) = legacy::sibling_shape(kind) {
        let other = address.sibling(sibling.key(), address.last_value());
        if ctx.model().contains(&other) {
            return Err(OperationError::Duplicate(format!(
                "{} is already defined as {}",
                address.last_value(),
                other
            )));
        }
    }

    ctx.model_mut().add(address, attributes)?;
    if kind == ResourceType::AddressSetting {
        check_queue_references(ctx, address, &QUEUE_REFERENCES);
    }

    let address = address.clone();
    let policy = handlers.policy;
    ctx.add_step(Stage::Runtime, move |ctx| perform_runtime(ctx, &address, policy));
    Ok(())
}

fn perform_runtime(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    policy: RuntimePolicy,
) -> Result<(), OperationError> {
    match policy {
        RuntimePolicy::ModelOnly | RuntimePolicy::RuntimeOnly | RuntimePolicy::Legacy => Ok(()),
        RuntimePolicy::Broker => {
            server::schedule_install(ctx, address.clone());
            Ok(())
        }
        RuntimePolicy::ReloadRequired { service } => {
            if let Some(service) = service {
                install_sub_service(ctx, address, service)?;
            }
            if ctx.gate().state(address).is_present() {
                tracing::info!("Adding {} requires a broker reload", address);
                ctx.reload_required();
            }
            Ok(())
        }
        RuntimePolicy::Live(live) => create_live(ctx, address, live),
    }
}

fn create_live(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    live: LiveHandlers,
) -> Result<(), OperationError> {
    let gate = ctx.gate();
    match gate.state(address) {
        BrokerState::Absent => {
            tracing::debug!("{} left for broker bootstrap", address);
            Ok(())
        }
        BrokerState::InstalledDown if live.requires_up => Err(OperationError::InvalidState(
            format!("broker for {} is installed but not started", address),
        )),
        BrokerState::InstalledDown => {
            tracing::debug!("{} applied at next broker start", address);
            Ok(())
        }
        BrokerState::UpPassive => Err(OperationError::StandbyRejection(
            STANDBY_MESSAGE.to_string(),
        )),
        BrokerState::UpActive => {
            let Some(broker) = gate.active_broker(address) else {
                return Ok(());
            };
            let target = LiveTarget::capture(ctx, address)?;
            let handback =
                (live.create)(broker.as_ref(), &target).map_err(control_failure("add", address))?;
            ctx.register_revert(move |_| (live.undo_create)(broker.as_ref(), &target, handback));
            Ok(())
        }
    }
}

/// Endpoint recorded by a group binding or HTTP upgrade service.
fn sub_service_value(
    ctx: &OperationContext<'_>,
    address: &PathAddress,
    service: SubService,
) -> Result<ServiceValue, OperationError> {
    let node = ctx.model().read(address)?;
    let text = |name: &str| {
        node.attribute(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Ok(match service {
        SubService::GroupBinding => ServiceValue::GroupBinding {
            endpoint: text("socket-binding")
                .or_else(|| text("jgroups-cluster"))
                .unwrap_or_default(),
        },
        SubService::HttpUpgrade => ServiceValue::HttpUpgrade {
            listener: text("http-listener").unwrap_or_default(),
        },
    })
}

pub(crate) fn sub_service_name(
    address: &PathAddress,
    service: SubService,
) -> Result<crate::service::name::ServiceName, OperationError> {
    Ok(match service {
        SubService::GroupBinding => group_binding(address, resource_type(address)?),
        SubService::HttpUpgrade => http_upgrade(address),
    })
}

fn install_sub_service(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    service: SubService,
) -> Result<(), OperationError> {
    let name = sub_service_name(address, service)?;
    let value = sub_service_value(ctx, address, service)?;
    ctx.registry()
        .install(name.clone(), value, ServiceState::Up)?;
    ctx.register_revert(move |registry| {
        registry.remove(&name);
        Ok(())
    });
    Ok(())
}

/// Warn when an address-setting points at a queue that is not configured.
///
/// Only advisory: resources may be declared in any order at boot.
pub(crate) fn check_queue_references(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    attributes: &[&str],
) {
    let Some(server_address) = address.parent() else {
        return;
    };
    let (Ok(setting), Ok(server)) = (ctx.model().read(address), ctx.model().read(&server_address))
    else {
        return;
    };
    let descriptor = ResourceType::AddressSetting.descriptor();

    let mut missing = Vec::new();
    for name in attributes {
        let (Some(attr), Some(stored)) = (descriptor.attribute(name), setting.attribute(name)) else {
            continue;
        };
        let Ok(Value::String(target)) = resolve_value(attr, stored, ctx.resolver()) else {
            continue;
        };
        if target.is_empty() {
            continue;
        }
        let known = server.children_of(ResourceType::Queue).any(|q| {
            q.name() == target
                || q.attribute("queue-address").and_then(Value::as_str) == Some(target.as_str())
        }) || server
            .children_of(ResourceType::JmsQueue)
            .any(|q| q.name() == target);
        if !known {
            missing.push(format!(
                "{} '{}' of {} does not match any queue of server '{}'",
                name,
                target,
                address,
                server.name()
            ));
        }
    }

    for warning in missing {
        tracing::warn!("{}", warning);
        ctx.add_warning(warning);
    }
}
