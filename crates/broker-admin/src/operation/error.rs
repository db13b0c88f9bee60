// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operation failures.

use crate::broker::control::ControlError;
use crate::model::node::ModelError;
use crate::model::validate::ValidationError;
use crate::model::PathAddress;
use crate::service::name::ServiceName;
use crate::service::registry::RegistryError;
use thiserror::Error;

/// Why an operation failed.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Server in backup mode: {0}")]
    StandbyRejection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Broker service {0} is not installed")]
    BrokerNotInstalled(ServiceName),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    #[error("Broker control call failed: {0}")]
    ControlApi(#[from] ControlError),

    #[error("Internal consistency fault: {0}")]
    InternalConsistency(String),

    #[error("Operation '{operation}' is not supported on {address}")]
    Unsupported {
        operation: String,
        address: PathAddress,
    },

    #[error("Attribute '{0}' is read-only")]
    ReadOnly(String),
}

impl OperationError {
    /// Static registration bug rather than a user error.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalConsistency(_))
    }

    pub fn unsupported(operation: &str, address: &PathAddress) -> Self {
        Self::Unsupported {
            operation: operation.to_string(),
            address: address.clone(),
        }
    }
}

impl From<ModelError> for OperationError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound(address) => Self::NotFound(address.to_string()),
            ModelError::Duplicate(address) => Self::Duplicate(address.to_string()),
            other => Self::NotFound(other.to_string()),
        }
    }
}

impl From<RegistryError> for OperationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Duplicate(name) => Self::Duplicate(name.to_string()),
            RegistryError::Missing(name) => Self::BrokerNotInstalled(name),
        }
    }
}
