// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `${name}` / `${name:default}` expression resolution.
//!
//! Names are looked up in the configured properties; `${env.NAME}` reads the
//! process environment.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

const ENV_PREFIX: &str = "env.";

/// Expression errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("Cannot resolve expression '{0}': no value and no default")]
    Unresolved(String),
}

fn expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("expression pattern is valid")
    })
}

/// Whether a string carries at least one expression.
pub fn is_expression(value: &str) -> bool {
    expression_pattern().is_match(value)
}

/// Resolves expressions against a property map.
#[derive(Debug, Clone, Default)]
pub struct ExpressionResolver {
    properties: BTreeMap<String, String>,
}

impl ExpressionResolver {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Set or replace a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(var) = name.strip_prefix(ENV_PREFIX) {
            return std::env::var(var).ok();
        }
        self.properties.get(name).cloned()
    }

    /// Replace every expression in `input`.
    pub fn resolve_str(&self, input: &str) -> Result<String, ExpressionError> {
        let mut failed = None;
        let resolved = expression_pattern().replace_all(input, |caps: &Captures<'_>| {
            let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            match self.lookup(name) {
                Some(value) => value,
                None => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        failed.get_or_insert_with(|| caps[0].to_string());
                        String::new()
                    }
                },
            }
        });

        match failed {
            Some(expr) => Err(ExpressionError::Unresolved(expr)),
            None => Ok(resolved.into_owned()),
        }
    }
}
