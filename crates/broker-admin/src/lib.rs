// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Messaging Broker Administration
//!
//! Keeps a declarative configuration model of a messaging subsystem in step
//! with the embedded brokers it describes.
//!
//! # Features
//!
//! - **Resource Model**: Validated tree of servers, queues, diverts, settings
//! - **Lifecycle Gate**: Every runtime change is decided by the broker state
//! - **Transactional Operations**: Failed operations revert model and broker
//! - **Legacy Shapes**: Generic group resources forwarded to concrete ones
//!
//! # Quick Start
//!
//! ```bash
//! # Boot from a configuration file and read operations from stdin
//! broker-admin --config broker-admin.toml
//!
//! # Run a batch of operations
//! broker-admin --config broker-admin.toml --script ops.json
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! name = "messaging-activemq"
//! backup_servers = []
//!
//! [properties]
//! "dlq.name" = "DLQ"
//!
//! [[boot]]
//! address = "/subsystem=messaging-activemq/server=default"
//!
//! [[boot]]
//! address = "/subsystem=messaging-activemq/server=default/queue=DLQ"
//! params = { queue-address = "${dlq.name}" }
//! ```

pub mod broker;
pub mod config;
pub mod handlers;
pub mod legacy;
pub mod model;
pub mod operation;
pub mod service;
pub mod subsystem;

pub use config::{AdminConfig, BootEntry, ConfigError};
pub use model::{PathAddress, ResourceModel, ResourceType};
pub use operation::{Operation, OperationError, OperationResult};
pub use service::{BrokerState, LifecycleGate};
pub use subsystem::{Subsystem, SubsystemError, SubsystemHandle};
