// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Staged execution of one operation (or one boot batch).
//!
//! Steps run stage by stage: every `Model` step, then every `Runtime`
//! step, then every `Verify` step. The first failing step aborts the
//! operation: revert actions run newest first, then the model goes back to
//! the snapshot taken when execution started.

use crate::broker::control::BrokerFactory;
use crate::handlers::table::HandlerTable;
use crate::model::{ExpressionResolver, ResourceModel};
use crate::operation::error::OperationError;
use crate::operation::op::OperationResult;
use crate::service::gate::LifecycleGate;
use crate::service::registry::ServiceRegistry;
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// Execution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Model,
    Runtime,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Model, Stage::Runtime, Stage::Verify];

    fn index(self) -> usize {
        match self {
            Self::Model => 0,
            Self::Runtime => 1,
            Self::Verify => 2,
        }
    }
}

/// A scheduled unit of work.
pub type Step = Box<dyn FnOnce(&mut OperationContext<'_>) -> Result<(), OperationError>>;

/// Undo of an applied runtime effect. Consumed at most once.
pub type RevertAction = Box<dyn FnOnce(&ServiceRegistry) -> Result<(), OperationError>>;

/// Everything handlers need besides the model and the registry.
///
/// Owned by the subsystem and passed down explicitly.
pub struct RuntimeSupport {
    pub resolver: ExpressionResolver,
    pub factory: Arc<dyn BrokerFactory>,
    /// Servers whose broker starts as a passive backup.
    pub backup_servers: BTreeSet<String>,
    pub handlers: HandlerTable,
}

impl RuntimeSupport {
    /// Create a new support object with the standard handler table.
    pub fn new(resolver: ExpressionResolver, factory: Arc<dyn BrokerFactory>) -> Self {
        Self {
            resolver,
            factory,
            backup_servers: BTreeSet::new(),
            handlers: HandlerTable::standard(),
        }
    }

    pub fn is_backup(&self, server: &str) -> bool {
        self.backup_servers.contains(server)
    }
}

/// In-flight operation state.
pub struct OperationContext<'a> {
    model: &'a mut ResourceModel,
    registry: &'a ServiceRegistry,
    support: &'a RuntimeSupport,
    booting: bool,
    stage: Stage,
    steps: [VecDeque<Step>; 3],
    reverts: Vec<RevertAction>,
    reload_required: bool,
    result: Value,
    warnings: Vec<String>,
}

impl<'a> OperationContext<'a> {
    /// Create a new context. `booting` marks a boot batch.
    pub fn new(
        model: &'a mut ResourceModel,
        registry: &'a ServiceRegistry,
        support: &'a RuntimeSupport,
        booting: bool,
    ) -> Self {
        Self {
            model,
            registry,
            support,
            booting,
            stage: Stage::Model,
            steps: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
            reverts: Vec::new(),
            reload_required: false,
            result: Value::Null,
            warnings: Vec::new(),
        }
    }

    pub fn model(&self) -> &ResourceModel {
        self.model
    }

    pub fn model_mut(&mut self) -> &mut ResourceModel {
        self.model
    }

    pub fn registry(&self) -> &'a ServiceRegistry {
        self.registry
    }

    pub fn support(&self) -> &'a RuntimeSupport {
        self.support
    }

    pub fn resolver(&self) -> &'a ExpressionResolver {
        &self.support.resolver
    }

    pub fn gate(&self) -> LifecycleGate<'a> {
        LifecycleGate::new(self.registry)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_booting(&self) -> bool {
        self.booting
    }

    // Stages already finished cannot take new steps; they run in the current one.
    fn queue_for(&mut self, stage: Stage) -> &mut VecDeque<Step> {
        let stage = stage.max(self.stage);
        &mut self.steps[stage.index()]
    }

    /// Queue a step at the end of `stage`.
    pub fn add_step<F>(&mut self, stage: Stage, step: F)
    where
        F: FnOnce(&mut OperationContext<'_>) -> Result<(), OperationError> + 'static,
    {
        self.queue_for(stage).push_back(Box::new(step));
    }

    /// Queue a step that runs before every other pending step of `stage`.
    pub fn add_step_immediate<F>(&mut self, stage: Stage, step: F)
    where
        F: FnOnce(&mut OperationContext<'_>) -> Result<(), OperationError> + 'static,
    {
        self.queue_for(stage).push_front(Box::new(step));
    }

    /// Record the undo of a runtime effect that just happened.
    pub fn register_revert<F>(&mut self, action: F)
    where
        F: FnOnce(&ServiceRegistry) -> Result<(), OperationError> + 'static,
    {
        self.reverts.push(Box::new(action));
    }

    /// Flag that the change only takes effect after a reload.
    pub fn reload_required(&mut self) {
        self.reload_required = true;
    }

    pub fn is_reload_required(&self) -> bool {
        self.reload_required
    }

    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Run every queued step and produce the result.
    pub fn run(mut self) -> OperationResult {
        let snapshot = self.model.clone();
        for stage in Stage::ALL {
            self.stage = stage;
            while let Some(step) = self.steps[stage.index()].pop_front() {
                if let Err(err) = step(&mut self) {
                    return self.rollback(snapshot, err);
                }
            }
        }
        OperationResult::success(self.result, self.reload_required, self.warnings)
    }

    fn rollback(mut self, snapshot: ResourceModel, err: OperationError) -> OperationResult {
        let reverts = std::mem::take(&mut self.reverts);
        let count = reverts.len();
        for revert in reverts.into_iter().rev() {
            if let Err(e) = revert(self.registry) {
                tracing::warn!("Revert action failed: {}", e);
            }
        }
        *self.model = snapshot;

        if err.is_internal() {
            tracing::error!("{}", err);
        }
        tracing::info!(
            "Operation rolled back during {:?} stage ({} revert actions): {}",
            self.stage,
            count,
            err
        );
        OperationResult::failed(err)
    }
}
