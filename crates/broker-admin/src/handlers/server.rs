// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broker installation for `server` resources.

use crate::broker::bootstrap::PendingConfigQueue;
use crate::broker::control::BrokerControl;
use crate::model::{PathAddress, ResourceModel};
use crate::operation::context::{OperationContext, RuntimeSupport, Stage};
use crate::operation::error::OperationError;
use crate::service::name::ServiceName;
use crate::service::registry::{ServiceState, ServiceValue};
use std::sync::Arc;

/// Create the broker of the server at `address` from its model subtree.
///
/// Consumes everything declared under the server so far, in declaration
/// order, in a single bootstrap call.
pub fn create_broker(
    model: &ResourceModel,
    support: &RuntimeSupport,
    address: &PathAddress,
) -> Result<Arc<dyn BrokerControl>, OperationError> {
    let pending = PendingConfigQueue::collect(model, address)?;
    let server = pending.server_name().to_string();
    tracing::debug!(
        "Consuming {} pending entries for server '{}'",
        pending.len(),
        server
    );
    let configuration = pending.into_configuration(&support.resolver)?;
    let backup = support.is_backup(&server);
    let broker = support.factory.create(configuration, backup)?;
    tracing::info!(
        "Broker '{}' installed ({})",
        server,
        if backup { "passive backup" } else { "live" }
    );
    Ok(broker)
}

/// Install the broker of a newly added server.
///
/// In a boot batch this waits for the `Verify` stage so every child declared
/// in the same batch reaches the broker through its bootstrap.
pub fn schedule_install(ctx: &mut OperationContext<'_>, address: PathAddress) {
    let stage = if ctx.is_booting() {
        Stage::Verify
    } else {
        Stage::Runtime
    };
    ctx.add_step(stage, move |ctx| install(ctx, &address));
}

fn install(ctx: &mut OperationContext<'_>, address: &PathAddress) -> Result<(), OperationError> {
    let name = ServiceName::broker(address.last_value());
    let broker = create_broker(ctx.model(), ctx.support(), address)?;
    ctx.registry()
        .install(name.clone(), ServiceValue::Broker(broker.clone()), ServiceState::Up)?;
    ctx.register_revert(move |registry| {
        registry.remove_tree(&name);
        broker.stop()?;
        Ok(())
    });
    Ok(())
}

/// Stop and uninstall the broker of a removed server with its sub-services.
pub fn uninstall(ctx: &mut OperationContext<'_>, address: &PathAddress) -> Result<(), OperationError> {
    let name = ServiceName::broker(address.last_value());
    let removed = ctx.registry().remove_tree(&name);
    if removed.is_empty() {
        return Ok(());
    }

    let brokers: Vec<Arc<dyn BrokerControl>> =
        removed.iter().filter_map(|c| c.broker().cloned()).collect();
    ctx.register_revert(move |registry| {
        for controller in removed {
            if let Some(broker) = controller.broker() {
                broker.start()?;
            }
            registry.restore(controller);
        }
        Ok(())
    });

    for broker in brokers {
        broker.stop()?;
        tracing::info!("Broker '{}' stopped and uninstalled", broker.name());
    }
    Ok(())
}
