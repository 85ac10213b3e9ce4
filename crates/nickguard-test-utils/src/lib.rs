//! Testing utilities for nickguard workspace
//!
//! Shared fixtures for building guards and registries in tests.

#![allow(missing_docs)]

use nickguard_core::{CollationStrength, CollisionGuard, EquivalenceGroup, GuardConfig, Limits};

/// Look-alike groups used across the integration suites
pub const LOOKALIKE_GROUPS: &[&str] = &["0, O, o", "1, l, I", "5, S", "8, B"];

/// A TOML configuration exercising both mapping forms
pub const SAMPLE_TOML: &str = r#"
collation_strength = "secondary"
mappings = [
    ["0", "O", "o"],
    "1, l, I",
    "m, rn",
]

[limits]
max_handle_len = 30
max_member_len = 4
"#;

pub fn group(spec: &str) -> EquivalenceGroup {
    EquivalenceGroup::parse(spec).unwrap()
}

pub fn config_with(groups: &[&str], strength: CollationStrength) -> GuardConfig {
    groups
        .iter()
        .fold(GuardConfig::new().with_strength(strength), |config, spec| {
            config.with_group(group(spec))
        })
}

pub fn guard_with(groups: &[&str], strength: CollationStrength) -> CollisionGuard {
    CollisionGuard::from_config(&config_with(groups, strength)).unwrap()
}

pub fn lookalike_guard() -> CollisionGuard {
    guard_with(LOOKALIKE_GROUPS, CollationStrength::Off)
}

pub fn tight_limits(max_handle_len: usize) -> Limits {
    Limits {
        max_handle_len,
        max_member_len: 4,
    }
}

pub fn registry(handles: &[&str]) -> Vec<String> {
    handles.iter().map(|h| (*h).to_string()).collect()
}
