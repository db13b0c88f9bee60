// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configuration model: addresses, descriptors, validation and the tree.

pub mod address;
pub mod attribute;
pub mod corrector;
pub mod descriptor;
pub mod expression;
pub mod node;
pub mod validate;

pub use address::{PathAddress, PathElement};
pub use attribute::{AttributeDefinition, AttributeKind, RestartFlag};
pub use corrector::correct_address;
pub use descriptor::{ResourceDescriptor, ResourceType};
pub use expression::ExpressionResolver;
pub use node::{ConfigNode, ModelError, ResourceModel};
pub use validate::ValidationError;
