// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `remove` handling, the mirror of `add`.
//!
//! The detached node is kept by the runtime step so a rollback can rebuild
//! the broker resource with the same construction logic as `add`.

use crate::handlers::add::sub_service_name;
use crate::handlers::control_failure;
use crate::handlers::server;
use crate::handlers::table::{LiveHandlers, LiveTarget, RuntimePolicy, SubService};
use crate::model::descriptor::ResourceType;
use crate::model::node::resource_type;
use crate::model::{ConfigNode, PathAddress};
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::{Operation, REMOVE};
use crate::service::gate::{BrokerState, STANDBY_MESSAGE};

pub fn schedule_remove(ctx: &mut OperationContext<'_>, op: Operation) -> Result<(), OperationError> {
    let kind = resource_type(&op.address)?;
    if kind.is_runtime_only() || kind == ResourceType::Subsystem {
        return Err(OperationError::unsupported(REMOVE, &op.address));
    }
    let address = op.address;
    ctx.add_step(Stage::Model, move |ctx| detach(ctx, kind, &address));
    Ok(())
}

/// Model stage of a remove.
pub(crate) fn detach(
    ctx: &mut OperationContext<'_>,
    kind: ResourceType,
    address: &PathAddress,
) -> Result<(), OperationError> {
    let handlers = ctx.support().handlers.get(kind)?;
    let removed = ctx.model_mut().remove(address)?;
    let address = address.clone();
    ctx.add_step(Stage::Runtime, move |ctx| {
        perform_runtime(ctx, &address, removed, handlers.policy)
    });
    Ok(())
}

fn perform_runtime(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    removed: ConfigNode,
    policy: RuntimePolicy,
) -> Result<(), OperationError> {
    match policy {
        RuntimePolicy::ModelOnly | RuntimePolicy::RuntimeOnly | RuntimePolicy::Legacy => Ok(()),
        RuntimePolicy::Broker => server::uninstall(ctx, address),
        RuntimePolicy::ReloadRequired { service } => {
            if let Some(service) = service {
                remove_sub_service(ctx, address, service)?;
            }
            if ctx.gate().state(address).is_present() {
                tracing::info!("Removing {} requires a broker reload", address);
                ctx.reload_required();
            }
            Ok(())
        }
        RuntimePolicy::Live(live) => destroy_live(ctx, address, removed, live),
    }
}

fn destroy_live(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    removed: ConfigNode,
    live: LiveHandlers,
) -> Result<(), OperationError> {
    let gate = ctx.gate();
    match gate.state(address) {
        // Never realized on a running broker.
        BrokerState::Absent | BrokerState::InstalledDown => Ok(()),
        BrokerState::UpPassive => Err(OperationError::StandbyRejection(
            STANDBY_MESSAGE.to_string(),
        )),
        BrokerState::UpActive => {
            let Some(broker) = gate.active_broker(address) else {
                return Ok(());
            };
            let target = LiveTarget {
                address: address.clone(),
                node: removed,
                resolver: ctx.resolver().clone(),
            };
            let handback = (live.destroy)(broker.as_ref(), &target)
                .map_err(control_failure("remove", address))?;
            ctx.register_revert(move |_| (live.undo_destroy)(broker.as_ref(), &target, handback));
            Ok(())
        }
    }
}

fn remove_sub_service(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    service: SubService,
) -> Result<(), OperationError> {
    let name = sub_service_name(address, service)?;
    if let Some(controller) = ctx.registry().remove(&name) {
        ctx.register_revert(move |registry| {
            registry.restore(controller);
            Ok(())
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::embedded::EmbeddedBrokerFactory;
    use crate::model::{ExpressionResolver, ResourceModel};
    use crate::operation::context::RuntimeSupport;
    use crate::service::registry::ServiceRegistry;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn support() -> RuntimeSupport {
        RuntimeSupport::new(
            ExpressionResolver::default(),
            Arc::new(EmbeddedBrokerFactory::new()),
        )
    }

    #[test]
    fn test_pending_remove_is_model_only() {
        let mut model = ResourceModel::new();
        let server = PathAddress::server("default");
        model.add(&server, BTreeMap::new()).expect("server");
        let setting = server.append("address-setting", "#");
        model.add(&setting, BTreeMap::new()).expect("setting");
        let registry = ServiceRegistry::new();
        let support = support();

        let mut ctx = OperationContext::new(&mut model, &registry, &support, false);
        schedule_remove(&mut ctx, Operation::remove(setting.clone())).expect("schedule");
        assert!(ctx.run().is_success());
        assert!(!model.contains(&setting));
    }

    #[test]
    fn test_missing_resource() {
        let mut model = ResourceModel::new();
        let registry = ServiceRegistry::new();
        let support = support();
        let mut ctx = OperationContext::new(&mut model, &registry, &support, false);
        schedule_remove(
            &mut ctx,
            Operation::remove(PathAddress::server("default").append("divert", "d")),
        )
        .expect("schedule");
        let result = ctx.run();
        assert!(matches!(result.error, Some(OperationError::NotFound(_))));
    }

    #[test]
    fn test_subsystem_cannot_be_removed() {
        let mut model = ResourceModel::new();
        let registry = ServiceRegistry::new();
        let support = support();
        let mut ctx = OperationContext::new(&mut model, &registry, &support, false);
        let err = schedule_remove(&mut ctx, Operation::remove(PathAddress::subsystem())).unwrap_err();
        assert!(matches!(err, OperationError::Unsupported { .. }));
    }
}
