// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operation handlers.
//!
//! Every operation is turned into steps on the operation context: model
//! changes in the `Model` stage, broker effects in the `Runtime` stage.
//! What a resource kind does at runtime is looked up in the
//! [`HandlerTable`](table::HandlerTable).

pub mod add;
pub mod control;
pub mod live;
pub mod read;
pub mod remove;
pub mod server;
pub mod table;
pub mod write;

use crate::legacy;
use crate::model::node::resource_type;
use crate::model::PathAddress;
use crate::operation::context::OperationContext;
use crate::operation::error::OperationError;
use crate::operation::op::{
    Operation, ADD, READ_ATTRIBUTE, READ_RESOURCE, REMOVE, UNDEFINE_ATTRIBUTE, WRITE_ATTRIBUTE,
};

pub use table::{HandlerTable, ResourceKindHandlers, RuntimePolicy};
pub use write::WriteOutcome;

/// Schedule the steps of `op` on `ctx`.
pub fn schedule(ctx: &mut OperationContext<'_>, op: Operation) -> Result<(), OperationError> {
    let op = match op.name.as_str() {
        ADD | REMOVE => op,
        _ => match legacy::forward_to_runtime_queue(ctx.model(), &op.address) {
            Some(address) => op.retarget(address),
            None => op,
        },
    };

    let kind = resource_type(&op.address)?;
    if kind.is_generic_group() {
        return legacy::schedule(ctx, kind, op);
    }

    match op.name.as_str() {
        ADD => add::schedule_add(ctx, op),
        REMOVE => remove::schedule_remove(ctx, op),
        WRITE_ATTRIBUTE | UNDEFINE_ATTRIBUTE => write::schedule_write(ctx, op),
        READ_ATTRIBUTE => read::schedule_read_attribute(ctx, op),
        READ_RESOURCE => read::schedule_read_resource(ctx, op),
        name if kind.descriptor().has_operation(name) => control::schedule_operation(ctx, op),
        _ => Err(OperationError::unsupported(&op.name, &op.address)),
    }
}

/// Log a failed control call before it aborts the operation.
pub(crate) fn control_failure(
    action: &str,
    address: &PathAddress,
) -> impl FnOnce(OperationError) -> OperationError {
    let action = action.to_string();
    let address = address.clone();
    move |err| {
        tracing::warn!("{} of {} failed on the broker: {}", action, address, err);
        err
    }
}
