// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The messaging subsystem.
//!
//! Owns the configuration model, the service registry and the runtime
//! support, and executes management operations one at a time. Operations
//! are serialized by construction: `Subsystem` takes `&mut self`, and the
//! async `SubsystemHandle` funnels every request through a single task.

use crate::broker::control::{BrokerControl, BrokerFactory};
use crate::config::{AdminConfig, ConfigError};
use crate::handlers;
use crate::handlers::server::create_broker;
use crate::model::{ExpressionResolver, PathAddress, ResourceModel};
use crate::operation::context::{OperationContext, RuntimeSupport};
use crate::operation::error::OperationError;
use crate::operation::op::{Operation, OperationResult};
use crate::service::gate::{BrokerState, LifecycleGate};
use crate::service::name::ServiceName;
use crate::service::registry::{RegistryError, ServiceRegistry, ServiceState, ServiceValue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Subsystem errors.
#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Boot failed: {0}")]
    Boot(String),

    #[error("Subsystem not running")]
    NotRunning,
}

impl From<RegistryError> for SubsystemError {
    fn from(err: RegistryError) -> Self {
        Self::Operation(err.into())
    }
}

/// Messaging subsystem state.
pub struct Subsystem {
    model: ResourceModel,
    registry: ServiceRegistry,
    support: RuntimeSupport,
    reload_required: bool,
}

impl Subsystem {
    /// Create an empty subsystem.
    ///
    /// Fails when the handler table leaves a live attribute without a
    /// mutator.
    pub fn new(support: RuntimeSupport) -> Result<Self, SubsystemError> {
        support.handlers.verify()?;
        Ok(Self {
            model: ResourceModel::new(),
            registry: ServiceRegistry::new(),
            support,
            reload_required: false,
        })
    }

    /// Create a subsystem and apply the boot operations of `config`.
    pub fn from_config(
        config: &AdminConfig,
        factory: Arc<dyn BrokerFactory>,
    ) -> Result<Self, SubsystemError> {
        config.validate()?;
        let mut support = RuntimeSupport::new(
            ExpressionResolver::new(config.properties.clone()),
            factory,
        );
        support.backup_servers = config.backup_servers.iter().cloned().collect();

        let mut subsystem = Self::new(support)?;
        subsystem.boot(config.boot_operations()?)?;
        tracing::info!(
            "Subsystem '{}' booted with {} servers",
            config.name,
            subsystem.model.server_names().len()
        );
        Ok(subsystem)
    }

    /// Execute one operation.
    ///
    /// The reload-required flag is only committed when the operation
    /// succeeds.
    pub fn execute(&mut self, op: Operation) -> OperationResult {
        tracing::debug!("Executing {} on {}", op.name, op.address);
        let mut ctx = OperationContext::new(&mut self.model, &self.registry, &self.support, false);
        if let Err(err) = handlers::schedule(&mut ctx, op) {
            tracing::debug!("Operation rejected: {}", err);
            return OperationResult::failed(err);
        }

        let result = ctx.run();
        if result.is_success() && result.reload_required {
            self.reload_required = true;
        }
        result
    }

    /// Apply a boot batch: every model step of every operation runs before
    /// any runtime step, and brokers are created last.
    pub fn boot(&mut self, ops: Vec<Operation>) -> Result<(), SubsystemError> {
        let count = ops.len();
        let mut ctx = OperationContext::new(&mut self.model, &self.registry, &self.support, true);
        for op in ops {
            handlers::schedule(&mut ctx, op)?;
        }

        let result = ctx.run();
        match result.error {
            Some(err) => Err(SubsystemError::Boot(err.to_string())),
            None => {
                tracing::debug!("Boot batch of {} operations applied", count);
                Ok(())
            }
        }
    }

    /// Recreate every broker from the current model.
    pub fn reload(&mut self) -> Result<(), SubsystemError> {
        for server in self.model.server_names() {
            self.restart_broker(&server)?;
        }
        self.reload_required = false;
        tracing::info!("Subsystem reloaded");
        Ok(())
    }

    /// Stop the broker of `server`, leaving its service installed and down.
    pub fn stop_server(&mut self, server: &str) -> Result<(), SubsystemError> {
        let name = ServiceName::broker(server);
        let controller = self
            .registry
            .get(&name)
            .ok_or(OperationError::BrokerNotInstalled(name.clone()))?;
        self.registry.set_state(&name, ServiceState::Down)?;
        if let Some(broker) = controller.broker() {
            broker.stop().map_err(OperationError::from)?;
        }
        tracing::info!("Broker '{}' stopped", server);
        Ok(())
    }

    /// Start the broker of `server` from the current model.
    pub fn start_server(&mut self, server: &str) -> Result<(), SubsystemError> {
        self.restart_broker(server)
    }

    fn restart_broker(&mut self, server: &str) -> Result<(), SubsystemError> {
        let name = ServiceName::broker(server);
        let broker = create_broker(&self.model, &self.support, &PathAddress::server(server))?;

        match self.registry.get(&name) {
            Some(previous) => {
                if let Some(old) = previous.broker() {
                    if old.is_started() {
                        old.stop().map_err(OperationError::from)?;
                    }
                }
                self.registry
                    .set_value(&name, ServiceValue::Broker(broker))?;
                self.registry.set_state(&name, ServiceState::Up)?;
            }
            None => {
                self.registry
                    .install(name, ServiceValue::Broker(broker), ServiceState::Up)?;
            }
        }
        Ok(())
    }

    pub fn is_reload_required(&self) -> bool {
        self.reload_required
    }

    pub fn model(&self) -> &ResourceModel {
        &self.model
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn support(&self) -> &RuntimeSupport {
        &self.support
    }

    /// Broker currently installed for `server`.
    pub fn broker(&self, server: &str) -> Option<Arc<dyn BrokerControl>> {
        self.registry
            .get(&ServiceName::broker(server))
            .and_then(|c| c.broker().cloned())
    }

    /// Lifecycle state of the broker owning `address`.
    pub fn state(&self, address: &PathAddress) -> BrokerState {
        LifecycleGate::new(&self.registry).state(address)
    }

    /// Move the subsystem into a task and return a handle to it.
    ///
    /// The task ends on [`SubsystemHandle::shutdown`] or when every handle
    /// is dropped, and yields the subsystem back.
    pub fn spawn(self) -> (SubsystemHandle, JoinHandle<Subsystem>) {
        let (tx, mut rx) = mpsc::channel::<Request>(32);
        let running = Arc::new(AtomicBool::new(true));
        let task_running = running.clone();

        let task = tokio::spawn(async move {
            let mut subsystem = self;
            while let Some(request) = rx.recv().await {
                match request {
                    Request::Execute { op, reply } => {
                        let result = subsystem.execute(op);
                        let _ = reply.send(result).await;
                    }
                    Request::Reload { reply } => {
                        let result = subsystem.reload().map_err(|e| e.to_string());
                        let _ = reply.send(result).await;
                    }
                    Request::Shutdown => break,
                }
            }
            task_running.store(false, Ordering::Relaxed);
            tracing::debug!("Subsystem task finished");
            subsystem
        });

        (SubsystemHandle { running, tx }, task)
    }
}

enum Request {
    Execute {
        op: Operation,
        reply: mpsc::Sender<OperationResult>,
    },
    Reload {
        reply: mpsc::Sender<Result<(), String>>,
    },
    Shutdown,
}

/// Handle to a spawned subsystem.
#[derive(Clone)]
pub struct SubsystemHandle {
    running: Arc<AtomicBool>,
    tx: mpsc::Sender<Request>,
}

impl SubsystemHandle {
    /// Check if the subsystem task is still serving requests.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Execute an operation and wait for its result.
    pub async fn execute(&self, op: Operation) -> Result<OperationResult, SubsystemError> {
        let (reply, mut rx) = mpsc::channel(1);
        self.tx
            .send(Request::Execute { op, reply })
            .await
            .map_err(|_| SubsystemError::NotRunning)?;
        rx.recv().await.ok_or(SubsystemError::NotRunning)
    }

    /// Reload every broker.
    pub async fn reload(&self) -> Result<(), SubsystemError> {
        let (reply, mut rx) = mpsc::channel(1);
        self.tx
            .send(Request::Reload { reply })
            .await
            .map_err(|_| SubsystemError::NotRunning)?;
        rx.recv()
            .await
            .ok_or(SubsystemError::NotRunning)?
            .map_err(SubsystemError::Boot)
    }

    /// Ask the subsystem task to stop after pending requests.
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
        let _ = self.tx.send(Request::Shutdown).await;
    }
}
