// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deprecated resource shapes.
//!
//! A generic `broadcast-group` or `discovery-group` is never stored: it is
//! translated to its JGroups or socket counterpart, chosen by whether a
//! JGroups cluster is named. Reads and writes against a `queue` address
//! with no managed resource go to the live `runtime-queue` view instead.

use crate::handlers::{add, read, remove, write};
use crate::model::descriptor::ResourceType;
use crate::model::node::ModelError;
use crate::model::validate::validate_and_populate;
use crate::model::{PathAddress, ResourceModel};
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::{
    Operation, ADD, NAME, READ_ATTRIBUTE, READ_RESOURCE, REMOVE, UNDEFINE_ATTRIBUTE,
    WRITE_ATTRIBUTE,
};
use serde_json::{Map, Value};

/// Attribute whose presence selects the JGroups shape.
pub const JGROUPS_CLUSTER: &str = "jgroups-cluster";

/// Concrete shapes of a generic group, JGroups first.
pub fn concrete_shapes(generic: ResourceType) -> Option<[ResourceType; 2]> {
    match generic {
        ResourceType::BroadcastGroup => Some([
            ResourceType::JGroupsBroadcastGroup,
            ResourceType::SocketBroadcastGroup,
        ]),
        ResourceType::DiscoveryGroup => Some([
            ResourceType::JGroupsDiscoveryGroup,
            ResourceType::SocketDiscoveryGroup,
        ]),
        _ => None,
    }
}

/// The other concrete shape of the same logical group.
pub fn sibling_shape(concrete: ResourceType) -> Option<ResourceType> {
    match concrete {
        ResourceType::JGroupsBroadcastGroup => Some(ResourceType::SocketBroadcastGroup),
        ResourceType::SocketBroadcastGroup => Some(ResourceType::JGroupsBroadcastGroup),
        ResourceType::JGroupsDiscoveryGroup => Some(ResourceType::SocketDiscoveryGroup),
        ResourceType::SocketDiscoveryGroup => Some(ResourceType::JGroupsDiscoveryGroup),
        _ => None,
    }
}

/// Pick the concrete shape of a generic group payload and keep only the
/// attributes that shape declares.
pub fn legacy_to_concrete(
    generic: ResourceType,
    params: &Map<String, Value>,
) -> Result<(ResourceType, Map<String, Value>), OperationError> {
    let [jgroups, socket] = concrete_shapes(generic).ok_or_else(|| {
        OperationError::InternalConsistency(format!("{} has no concrete shapes", generic))
    })?;
    let uses_jgroups = params
        .get(JGROUPS_CLUSTER)
        .map(|v| !v.is_null())
        .unwrap_or(false);
    let concrete = if uses_jgroups { jgroups } else { socket };

    let descriptor = concrete.descriptor();
    let payload = params
        .iter()
        .filter(|(name, value)| !value.is_null() && descriptor.attribute(name).is_some())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    Ok((concrete, payload))
}

/// Schedule an operation addressed at a generic group.
pub fn schedule(
    ctx: &mut OperationContext<'_>,
    generic: ResourceType,
    op: Operation,
) -> Result<(), OperationError> {
    match op.name.as_str() {
        ADD => {
            ctx.add_step(Stage::Model, move |ctx| forward_add(ctx, generic, op));
            Ok(())
        }
        REMOVE => {
            ctx.add_step(Stage::Model, move |ctx| forward_remove(ctx, generic, &op.address));
            Ok(())
        }
        READ_ATTRIBUTE | READ_RESOURCE | WRITE_ATTRIBUTE | UNDEFINE_ATTRIBUTE => {
            ctx.add_step(Stage::Model, move |ctx| forward_access(ctx, generic, op));
            Ok(())
        }
        _ => Err(OperationError::unsupported(&op.name, &op.address)),
    }
}

fn forward_add(
    ctx: &mut OperationContext<'_>,
    generic: ResourceType,
    op: Operation,
) -> Result<(), OperationError> {
    validate_and_populate(generic.descriptor(), &op.params, ctx.resolver())?;
    let (concrete, payload) = legacy_to_concrete(generic, &op.params)?;
    let target = op.address.sibling(concrete.key(), op.address.last_value());
    tracing::debug!("Forwarding add of {} to {}", op.address, target);
    ctx.add_step_immediate(Stage::Model, move |ctx| {
        add::populate(ctx, concrete, &target, &payload)
    });
    Ok(())
}

fn forward_remove(
    ctx: &mut OperationContext<'_>,
    generic: ResourceType,
    address: &PathAddress,
) -> Result<(), OperationError> {
    let [jgroups, socket] = concrete_shapes(generic).ok_or_else(|| {
        OperationError::InternalConsistency(format!("{} has no concrete shapes", generic))
    })?;

    let probe = address.sibling(jgroups.key(), address.last_value());
    let (kind, target) = match ctx.model().read(&probe) {
        Ok(_) => (jgroups, probe),
        Err(ModelError::NotFound(_)) => {
            let fallback = address.sibling(socket.key(), address.last_value());
            if !ctx.model().contains(&fallback) {
                return Err(OperationError::NotFound(address.to_string()));
            }
            (socket, fallback)
        }
        Err(err) => return Err(err.into()),
    };
    tracing::debug!("Forwarding remove of {} to {}", address, target);
    ctx.add_step_immediate(Stage::Model, move |ctx| remove::detach(ctx, kind, &target));
    Ok(())
}

/// Concrete resource currently backing a generic group address.
pub fn resolve_concrete(
    model: &ResourceModel,
    generic: ResourceType,
    address: &PathAddress,
) -> Result<(ResourceType, PathAddress), OperationError> {
    let shapes = concrete_shapes(generic).ok_or_else(|| {
        OperationError::InternalConsistency(format!("{} has no concrete shapes", generic))
    })?;
    shapes
        .into_iter()
        .map(|kind| (kind, address.sibling(kind.key(), address.last_value())))
        .find(|(_, target)| model.contains(target))
        .ok_or_else(|| OperationError::NotFound(address.to_string()))
}

fn forward_access(
    ctx: &mut OperationContext<'_>,
    generic: ResourceType,
    op: Operation,
) -> Result<(), OperationError> {
    let (concrete, target) = resolve_concrete(ctx.model(), generic, &op.address)?;
    tracing::debug!("Forwarding {} of {} to {}", op.name, op.address, target);

    // Attributes of the other shape read as undefined.
    if op.name == READ_ATTRIBUTE {
        let name = op.param_str(NAME)?;
        if concrete.descriptor().attribute(name).is_none()
            && generic.descriptor().attribute(name).is_some()
        {
            ctx.set_result(Value::Null);
            return Ok(());
        }
    }

    let op = op.retarget(target);
    match op.name.as_str() {
        READ_ATTRIBUTE => read::schedule_read_attribute(ctx, op),
        READ_RESOURCE => read::schedule_read_resource(ctx, op),
        _ => write::schedule_write(ctx, op),
    }
}

/// Runtime-queue address for an operation on an unmanaged queue.
///
/// Redirects only `queue` addresses with no resource under an existing
/// server, so a redirected address is never redirected again.
pub fn forward_to_runtime_queue(
    model: &ResourceModel,
    address: &PathAddress,
) -> Option<PathAddress> {
    let last = address.last()?;
    if last.key != ResourceType::Queue.key() || model.contains(address) {
        return None;
    }
    let server = address.parent()?;
    if !model.contains(&server) {
        return None;
    }
    let target = server.append(ResourceType::RuntimeQueue.key(), last.value.clone());
    tracing::debug!("No managed queue at {}, using {}", address, target);
    Some(target)
}
