// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime services: naming, location, registry and the lifecycle gate.

pub mod gate;
pub mod locator;
pub mod name;
pub mod registry;

pub use gate::{BrokerState, LifecycleGate, ReadGate, WriteGate};
pub use locator::locate_broker;
pub use name::ServiceName;
pub use registry::{ServiceController, ServiceRegistry, ServiceState, ServiceValue};
