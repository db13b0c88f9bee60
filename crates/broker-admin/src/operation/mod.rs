// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operations, their staged execution context and failures.

pub mod context;
pub mod error;
pub mod op;

pub use context::{OperationContext, RevertAction, RuntimeSupport, Stage, Step};
pub use error::OperationError;
pub use op::{Operation, OperationResult, Outcome};
