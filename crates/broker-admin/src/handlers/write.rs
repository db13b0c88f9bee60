// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `write-attribute` and `undefine-attribute`.
//!
//! The decision is taken per attribute, in order: restart-flagged
//! attributes need a reload, a broker that is missing, down or passive
//! leaves the model change to the next start, and an active broker gets the
//! attribute's mutator with the previous runtime state kept as handback.

use crate::broker::control::BrokerControl;
use crate::handlers::add::check_queue_references;
use crate::handlers::control_failure;
use crate::handlers::table::{Handback, LiveTarget, Mutator};
use crate::model::descriptor::ResourceType;
use crate::model::node::resource_type;
use crate::model::validate::{resolved_attribute, validate_write, ValidationError};
use crate::model::PathAddress;
use crate::operation::context::{OperationContext, Stage};
use crate::operation::error::OperationError;
use crate::operation::op::{Operation, NAME, UNDEFINE_ATTRIBUTE, VALUE};
use serde_json::Value;

/// How a write reached the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Applied to the running broker.
    Applied,
    /// Takes effect after a reload.
    RequiresRestart,
    /// Model updated only; the broker picks it up when it starts.
    Deferred,
}

pub fn schedule_write(ctx: &mut OperationContext<'_>, op: Operation) -> Result<(), OperationError> {
    let name = op.param_str(NAME)?.to_string();
    let value = if op.name == UNDEFINE_ATTRIBUTE {
        Value::Null
    } else {
        op.param(VALUE).cloned().unwrap_or(Value::Null)
    };
    let address = op.address;
    ctx.add_step(Stage::Model, move |ctx| update_model(ctx, &address, &name, &value));
    Ok(())
}

fn update_model(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    name: &str,
    value: &Value,
) -> Result<(), OperationError> {
    let kind = resource_type(address)?;
    let descriptor = kind.descriptor();
    if descriptor.attribute(name).map(|a| a.is_runtime()).unwrap_or(false) {
        return Err(OperationError::ReadOnly(name.to_string()));
    }

    let node = ctx.model().read(address)?;
    let stored = validate_write(descriptor, node.attributes(), name, value, ctx.resolver())?;
    let previous = ctx.model_mut().write(address, name, stored)?;
    tracing::debug!("{} of {} written (previously {:?})", name, address, previous);

    if kind == ResourceType::AddressSetting {
        check_queue_references(ctx, address, &[name]);
    }

    let address = address.clone();
    let name = name.to_string();
    ctx.add_step(Stage::Runtime, move |ctx| {
        let outcome = apply_update_to_runtime(ctx, &address, &name)?;
        tracing::debug!("{} of {}: {:?}", name, address, outcome);
        Ok(())
    });
    Ok(())
}

/// Push the stored value of `name` to the broker backing `address`.
///
/// Runs after the model write, so live handlers see the new value.
pub fn apply_update_to_runtime(
    ctx: &mut OperationContext<'_>,
    address: &PathAddress,
    name: &str,
) -> Result<WriteOutcome, OperationError> {
    let kind = resource_type(address)?;
    let descriptor = kind.descriptor();
    let attr = descriptor
        .attribute(name)
        .ok_or_else(|| ValidationError::UndeclaredAttribute {
            resource: kind,
            attribute: name.to_string(),
        })?;

    let gate = ctx.gate();
    if attr.requires_restart() {
        if gate.state(address).is_present() {
            tracing::info!("{} of {} takes effect after a reload", name, address);
            ctx.reload_required();
        }
        return Ok(WriteOutcome::RequiresRestart);
    }

    let Some(broker) = gate.active_broker(address) else {
        tracing::debug!(
            "Broker for {} is {}, {} not applied live",
            address,
            gate.state(address),
            name
        );
        return Ok(WriteOutcome::Deferred);
    };

    let mutator = ctx.support().handlers.mutator(kind, name).ok_or_else(|| {
        OperationError::InternalConsistency(format!(
            "live attribute '{}' of {} has no mutator",
            name, kind
        ))
    })?;

    let target = LiveTarget::capture(ctx, address)?;
    let value = resolved_attribute(descriptor, target.node.attributes(), name, ctx.resolver())?;
    let handback = (mutator.apply)(broker.as_ref(), &target, &value)
        .map_err(control_failure("write-attribute", address))?;
    ctx.register_revert(move |_| {
        revert_update_to_runtime(broker.as_ref(), &target, mutator, handback)
    });
    Ok(WriteOutcome::Applied)
}

/// Restore exactly the runtime state captured by `apply_update_to_runtime`.
pub fn revert_update_to_runtime(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    mutator: Mutator,
    handback: Handback,
) -> Result<(), OperationError> {
    tracing::debug!("Reverting {} of {}", mutator.attribute, target.address);
    (mutator.revert)(broker, target, handback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::configuration::BrokerConfiguration;
    use crate::broker::embedded::{EmbeddedBroker, EmbeddedBrokerFactory};
    use crate::handlers::table::{HandlerTable, ResourceKindHandlers, RuntimePolicy};
    use crate::model::{ExpressionResolver, ResourceModel};
    use crate::operation::context::RuntimeSupport;
    use crate::service::name::ServiceName;
    use crate::service::registry::{ServiceRegistry, ServiceState, ServiceValue};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct Fixture {
        model: ResourceModel,
        registry: ServiceRegistry,
        support: RuntimeSupport,
        broker: Arc<EmbeddedBroker>,
    }

    fn fixture(backup: bool) -> Fixture {
        let mut model = ResourceModel::new();
        model
            .add(&PathAddress::server("default"), BTreeMap::new())
            .expect("server");
        let registry = ServiceRegistry::new();
        let broker = Arc::new(EmbeddedBroker::new(
            BrokerConfiguration::named("default"),
            backup,
        ));
        registry
            .install(
                ServiceName::broker("default"),
                ServiceValue::Broker(broker.clone()),
                ServiceState::Up,
            )
            .expect("install");
        Fixture {
            model,
            registry,
            support: RuntimeSupport::new(
                ExpressionResolver::default(),
                Arc::new(EmbeddedBrokerFactory::new()),
            ),
            broker,
        }
    }

    fn write(f: &mut Fixture, address: PathAddress, name: &str, value: Value) -> WriteOutcome {
        let mut ctx = OperationContext::new(&mut f.model, &f.registry, &f.support, false);
        let model_address = address.clone();
        let attribute = name.to_string();
        ctx.model_mut()
            .write(&model_address, &attribute, value)
            .expect("model write");
        apply_update_to_runtime(&mut ctx, &address, name).expect("apply")
    }

    #[test]
    fn test_live_write_on_active_broker() {
        let mut f = fixture(false);
        let outcome = write(
            &mut f,
            PathAddress::server("default"),
            "message-counter-sample-period",
            json!(2000),
        );
        assert_eq!(outcome, WriteOutcome::Applied);
        assert_eq!(f.broker.message_counter_sample_period(), 2000);
    }

    #[test]
    fn test_passive_broker_defers() {
        let mut f = fixture(true);
        let outcome = write(
            &mut f,
            PathAddress::server("default"),
            "message-counter-sample-period",
            json!(2000),
        );
        assert_eq!(outcome, WriteOutcome::Deferred);
        assert!(f.broker.calls().is_empty());
    }

    #[test]
    fn test_restart_attribute_flags_reload() {
        let mut f = fixture(false);
        let mut ctx = OperationContext::new(&mut f.model, &f.registry, &f.support, false);
        let outcome =
            apply_update_to_runtime(&mut ctx, &PathAddress::server("default"), "journal-type")
                .expect("apply");
        assert_eq!(outcome, WriteOutcome::RequiresRestart);
        assert!(ctx.is_reload_required());
    }

    #[test]
    fn test_unmapped_live_attribute_is_internal() {
        let mut f = fixture(false);
        let mut table = HandlerTable::standard();
        table.register(ResourceKindHandlers::new(
            ResourceType::Server,
            RuntimePolicy::Broker,
        ));
        f.support.handlers = table;

        let mut ctx = OperationContext::new(&mut f.model, &f.registry, &f.support, false);
        let err = apply_update_to_runtime(
            &mut ctx,
            &PathAddress::server("default"),
            "statistics-enabled",
        )
        .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_runtime_attribute_is_read_only() {
        let mut f = fixture(false);
        let mut ctx = OperationContext::new(&mut f.model, &f.registry, &f.support, false);
        schedule_write(
            &mut ctx,
            Operation::write_attribute(PathAddress::server("default"), "version", "x"),
        )
        .expect("schedule");
        assert!(matches!(ctx.run().error, Some(OperationError::ReadOnly(_))));
    }

    #[test]
    fn test_failed_operation_reverts_live_write() {
        let mut f = fixture(false);
        let mut ctx = OperationContext::new(&mut f.model, &f.registry, &f.support, false);
        schedule_write(
            &mut ctx,
            Operation::write_attribute(PathAddress::server("default"), "statistics-enabled", true),
        )
        .expect("schedule");
        ctx.add_step(Stage::Verify, |_| {
            Err(OperationError::InvalidState("forced".into()))
        });
        assert!(!ctx.run().is_success());
        assert!(!f.broker.is_message_counter_enabled());
        assert_eq!(
            f.broker.calls(),
            vec!["enable_message_counters()", "disable_message_counters()"]
        );
    }
}
