// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Control-API calls for resources and attributes applied live.
//!
//! Settings and security entries are shared broker maps: every change
//! rebuilds the whole entry for its match and hands back the previous one,
//! so a revert is a plain structural replace.

use crate::broker::bootstrap;
use crate::broker::configuration::replace_role;
use crate::broker::control::BrokerControl;
use crate::handlers::table::{Handback, LiveHandlers, LiveTarget, Mutator};
use crate::model::descriptor::ROLE_PERMISSIONS;
use crate::model::validate::ValidationError;
use crate::operation::error::OperationError;
use serde_json::Value;

fn expect_i64(attribute: &str, value: &Value) -> Result<i64, OperationError> {
    value.as_i64().ok_or_else(|| {
        ValidationError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: "LONG",
            found: value.to_string(),
        }
        .into()
    })
}

fn mismatched_handback(handback: &Handback) -> OperationError {
    OperationError::InternalConsistency(format!("unexpected handback {:?}", handback))
}

// Diverts

fn create_divert(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.create_divert(&bootstrap::divert(&target.node, &target.resolver)?)?;
    Ok(Handback::None)
}

fn destroy_divert(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.destroy_divert(target.node.name())?;
    Ok(Handback::None)
}

fn undo_create_divert(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    destroy_divert(broker, target).map(|_| ())
}

fn undo_destroy_divert(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    create_divert(broker, target).map(|_| ())
}

pub const DIVERT: LiveHandlers = LiveHandlers {
    create: create_divert,
    undo_create: undo_create_divert,
    destroy: destroy_divert,
    undo_destroy: undo_destroy_divert,
    requires_up: true,
};

// Bridges

fn create_bridge(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.deploy_bridge(&bootstrap::bridge(&target.node, &target.resolver)?)?;
    Ok(Handback::None)
}

fn destroy_bridge(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.destroy_bridge(target.node.name())?;
    Ok(Handback::None)
}

fn undo_create_bridge(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    destroy_bridge(broker, target).map(|_| ())
}

fn undo_destroy_bridge(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    create_bridge(broker, target).map(|_| ())
}

pub const BRIDGE: LiveHandlers = LiveHandlers {
    create: create_bridge,
    undo_create: undo_create_bridge,
    destroy: destroy_bridge,
    undo_destroy: undo_destroy_bridge,
    requires_up: false,
};

// Core and JMS queues

fn create_queue(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.deploy_queue(&bootstrap::queue(&target.node, &target.resolver)?)?;
    Ok(Handback::None)
}

fn destroy_queue(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    broker.destroy_queue(target.node.name())?;
    Ok(Handback::None)
}

fn undo_create_queue(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    destroy_queue(broker, target).map(|_| ())
}

fn undo_destroy_queue(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: Handback,
) -> Result<(), OperationError> {
    create_queue(broker, target).map(|_| ())
}

pub const QUEUE: LiveHandlers = LiveHandlers {
    create: create_queue,
    undo_create: undo_create_queue,
    destroy: destroy_queue,
    undo_destroy: undo_destroy_queue,
    requires_up: true,
};

// Address settings

fn put_address_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
) -> Result<Handback, OperationError> {
    let pattern = target.node.name();
    let settings = bootstrap::address_settings(&target.node, &target.resolver)?;
    let previous = broker.address_settings_match(pattern);
    broker.add_address_settings_match(pattern, settings)?;
    Ok(Handback::AddressSettings(previous))
}

fn remove_address_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
) -> Result<Handback, OperationError> {
    let pattern = target.node.name();
    let previous = broker.address_settings_match(pattern);
    broker.remove_address_settings_match(pattern)?;
    Ok(Handback::AddressSettings(previous))
}

fn restore_address_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    let pattern = target.node.name();
    match handback {
        Handback::AddressSettings(Some(previous)) => {
            broker.add_address_settings_match(pattern, previous)?
        }
        Handback::AddressSettings(None) => broker.remove_address_settings_match(pattern)?,
        other => return Err(mismatched_handback(&other)),
    }
    Ok(())
}

fn apply_address_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: &Value,
) -> Result<Handback, OperationError> {
    put_address_setting(broker, target)
}

pub const ADDRESS_SETTING: LiveHandlers = LiveHandlers {
    create: put_address_setting,
    undo_create: restore_address_setting,
    destroy: remove_address_setting,
    undo_destroy: restore_address_setting,
    requires_up: false,
};

const fn settings_mutator(attribute: &'static str) -> Mutator {
    Mutator {
        attribute,
        apply: apply_address_setting,
        revert: restore_address_setting,
    }
}

pub static ADDRESS_SETTING_MUTATORS: &[Mutator] = &[
    settings_mutator("dead-letter-address"),
    settings_mutator("expiry-address"),
    settings_mutator("expiry-delay"),
    settings_mutator("redelivery-delay"),
    settings_mutator("max-delivery-attempts"),
    settings_mutator("max-size-bytes"),
    settings_mutator("page-size-bytes"),
    settings_mutator("address-full-policy"),
    settings_mutator("message-counter-history-day-limit"),
    settings_mutator("redistribution-delay"),
    settings_mutator("send-to-dla-on-no-route"),
    settings_mutator("last-value-queue"),
    settings_mutator("auto-create-queues"),
    settings_mutator("auto-delete-queues"),
    settings_mutator("auto-create-addresses"),
];

// Security settings and roles

fn restore_roles(
    broker: &dyn BrokerControl,
    pattern: &str,
    handback: Handback,
) -> Result<(), OperationError> {
    match handback {
        Handback::Roles(Some(previous)) => broker.add_security_match(pattern, previous)?,
        Handback::Roles(None) => broker.remove_security_match(pattern)?,
        other => return Err(mismatched_handback(&other)),
    }
    Ok(())
}

fn put_security_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
) -> Result<Handback, OperationError> {
    let pattern = target.node.name();
    let roles = bootstrap::roles(&target.node, &target.resolver)?;
    let previous = broker.security_match(pattern);
    broker.add_security_match(pattern, roles)?;
    Ok(Handback::Roles(previous))
}

fn remove_security_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
) -> Result<Handback, OperationError> {
    let pattern = target.node.name();
    let previous = broker.security_match(pattern);
    broker.remove_security_match(pattern)?;
    Ok(Handback::Roles(previous))
}

fn restore_security_setting(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    restore_roles(broker, target.node.name(), handback)
}

pub const SECURITY_SETTING: LiveHandlers = LiveHandlers {
    create: put_security_setting,
    undo_create: restore_security_setting,
    destroy: remove_security_setting,
    undo_destroy: restore_security_setting,
    requires_up: false,
};

fn put_role(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    let pattern = target.parent_name();
    let role = bootstrap::role(&target.node, &target.resolver)?;
    let previous = broker.security_match(pattern);
    let mut roles = previous.clone().unwrap_or_default();
    replace_role(&mut roles, role);
    broker.add_security_match(pattern, roles)?;
    Ok(Handback::Roles(previous))
}

fn remove_role(broker: &dyn BrokerControl, target: &LiveTarget) -> Result<Handback, OperationError> {
    let pattern = target.parent_name();
    let previous = broker.security_match(pattern);
    let mut roles = previous.clone().unwrap_or_default();
    roles.retain(|r| r.name != target.node.name());
    broker.add_security_match(pattern, roles)?;
    Ok(Handback::Roles(previous))
}

fn restore_role(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    restore_roles(broker, target.parent_name(), handback)
}

fn apply_role(
    broker: &dyn BrokerControl,
    target: &LiveTarget,
    _: &Value,
) -> Result<Handback, OperationError> {
    put_role(broker, target)
}

pub const ROLE: LiveHandlers = LiveHandlers {
    create: put_role,
    undo_create: restore_role,
    destroy: remove_role,
    undo_destroy: restore_role,
    requires_up: false,
};

const fn role_mutator(attribute: &'static str) -> Mutator {
    Mutator {
        attribute,
        apply: apply_role,
        revert: restore_role,
    }
}

pub static ROLE_MUTATORS: &[Mutator] = &[
    role_mutator(ROLE_PERMISSIONS[0]),
    role_mutator(ROLE_PERMISSIONS[1]),
    role_mutator(ROLE_PERMISSIONS[2]),
    role_mutator(ROLE_PERMISSIONS[3]),
    role_mutator(ROLE_PERMISSIONS[4]),
    role_mutator(ROLE_PERMISSIONS[5]),
    role_mutator(ROLE_PERMISSIONS[6]),
    role_mutator(ROLE_PERMISSIONS[7]),
    role_mutator(ROLE_PERMISSIONS[8]),
    role_mutator(ROLE_PERMISSIONS[9]),
];

// Server message counters

fn apply_statistics_enabled(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    value: &Value,
) -> Result<Handback, OperationError> {
    let previous = broker.is_message_counter_enabled();
    if value.as_bool().unwrap_or(false) {
        broker.enable_message_counters()?;
    } else {
        broker.disable_message_counters()?;
    }
    Ok(Handback::Bool(previous))
}

fn revert_statistics_enabled(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    match handback {
        Handback::Bool(true) => broker.enable_message_counters()?,
        Handback::Bool(false) => broker.disable_message_counters()?,
        other => return Err(mismatched_handback(&other)),
    }
    Ok(())
}

fn apply_sample_period(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    value: &Value,
) -> Result<Handback, OperationError> {
    let period = expect_i64("message-counter-sample-period", value)?;
    let previous = broker.message_counter_sample_period();
    broker.set_message_counter_sample_period(period)?;
    Ok(Handback::Long(previous))
}

fn revert_sample_period(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    match handback {
        Handback::Long(previous) => broker.set_message_counter_sample_period(previous)?,
        other => return Err(mismatched_handback(&other)),
    }
    Ok(())
}

fn apply_max_day_history(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    value: &Value,
) -> Result<Handback, OperationError> {
    let days = expect_i64("message-counter-max-day-history", value)?;
    let days = i32::try_from(days).map_err(|_| ValidationError::OutOfRange {
        attribute: "message-counter-max-day-history".to_string(),
        value: days,
        min: 1,
        max: i32::MAX as i64,
    })?;
    let previous = broker.message_counter_max_day_count();
    broker.set_message_counter_max_day_count(days)?;
    Ok(Handback::Int(previous))
}

fn revert_max_day_history(
    broker: &dyn BrokerControl,
    _: &LiveTarget,
    handback: Handback,
) -> Result<(), OperationError> {
    match handback {
        Handback::Int(previous) => broker.set_message_counter_max_day_count(previous)?,
        other => return Err(mismatched_handback(&other)),
    }
    Ok(())
}

pub static SERVER_MUTATORS: &[Mutator] = &[
    Mutator {
        attribute: "statistics-enabled",
        apply: apply_statistics_enabled,
        revert: revert_statistics_enabled,
    },
    Mutator {
        attribute: "message-counter-sample-period",
        apply: apply_sample_period,
        revert: revert_sample_period,
    },
    Mutator {
        attribute: "message-counter-max-day-history",
        apply: apply_max_day_history,
        revert: revert_max_day_history,
    },
];
