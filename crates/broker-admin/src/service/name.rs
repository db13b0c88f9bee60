// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stable names of runtime services.

use serde::Serialize;
use std::fmt;

/// Namespace root shared by every messaging service.
pub const NAMESPACE: &str = "jboss.messaging-activemq";

/// Name used when an address carries no server segment.
pub const DEFAULT_SERVER: &str = "default";

/// Dotted, deterministic service identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Service of the broker backing server `server`.
    pub fn broker(server: &str) -> Self {
        Self(format!("{}.{}", NAMESPACE, server))
    }

    /// Child service below this one.
    pub fn append(&self, part: &str) -> Self {
        Self(format!("{}.{}", self.0, part))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `self` is `other` or one of its children.
    pub fn is_under(&self, other: &ServiceName) -> bool {
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('.'))
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_name() {
        assert_eq!(
            ServiceName::broker("default").as_str(),
            "jboss.messaging-activemq.default"
        );
    }

    #[test]
    fn test_is_under() {
        let broker = ServiceName::broker("a");
        let child = broker.append("queue").append("q1");
        assert!(child.is_under(&broker));
        assert!(broker.is_under(&broker));
        assert!(!ServiceName::broker("ab").is_under(&broker));
    }
}
