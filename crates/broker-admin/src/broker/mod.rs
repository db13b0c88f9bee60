// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broker side: control handle, configuration objects and the in-memory
//! broker used by the binary and the tests.

pub mod bootstrap;
pub mod configuration;
pub mod control;
pub mod embedded;

pub use bootstrap::PendingConfigQueue;
pub use configuration::{AddressSettings, BrokerConfiguration, Role};
pub use control::{BrokerControl, BrokerFactory, ControlError, QueueStatus};
pub use embedded::{BrokerSnapshot, EmbeddedBroker, EmbeddedBrokerFactory};
