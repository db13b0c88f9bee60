// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write-time normalization of address-like attributes.

/// Legacy prefixes carried by JMS destinations of older broker versions.
const LEGACY_PREFIXES: [&str; 2] = ["jms.queue.", "jms.topic."];

/// Bare legacy root, normalized to the empty address.
const LEGACY_ROOT: &str = "jms";

/// Normalize an address to its canonical form.
///
/// Strips every leading legacy prefix and maps the bare `jms` root to the
/// empty string. The result never starts with a legacy prefix and is never
/// `jms`, so `correct_address(correct_address(x)) == correct_address(x)`.
pub fn correct_address(address: &str) -> String {
    let mut current = address;
    while let Some(stripped) = LEGACY_PREFIXES
        .iter()
        .find_map(|prefix| current.strip_prefix(prefix))
    {
        current = stripped;
    }

    if current == LEGACY_ROOT {
        String::new()
    } else {
        current.to_string()
    }
}
