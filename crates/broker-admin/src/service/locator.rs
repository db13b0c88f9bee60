// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Address to service-name mapping. Pure functions, no I/O.

use crate::model::descriptor::ResourceType;
use crate::model::PathAddress;
use crate::service::name::{ServiceName, DEFAULT_SERVER};

/// Service of the broker owning `address`.
///
/// Walks from the leaf toward the root and stops at the first server
/// segment; without one, the default broker.
pub fn locate_broker(address: &PathAddress) -> ServiceName {
    address
        .elements()
        .iter()
        .rev()
        .find(|e| e.key == ResourceType::Server.key())
        .map(|e| ServiceName::broker(&e.value))
        .unwrap_or_else(|| ServiceName::broker(DEFAULT_SERVER))
}

/// Name of the server owning `address`.
pub fn server_name(address: &PathAddress) -> &str {
    address
        .elements()
        .iter()
        .rev()
        .find(|e| e.key == ResourceType::Server.key())
        .map(|e| e.value.as_str())
        .unwrap_or(DEFAULT_SERVER)
}

/// Group binding service of a concrete broadcast or discovery group.
pub fn group_binding(address: &PathAddress, kind: ResourceType) -> ServiceName {
    locate_broker(address)
        .append(kind.key())
        .append(address.last_value())
}

/// HTTP upgrade bridge service of an http-acceptor.
pub fn http_upgrade(address: &PathAddress) -> ServiceName {
    locate_broker(address)
        .append("http-upgrade-service")
        .append(address.last_value())
}
