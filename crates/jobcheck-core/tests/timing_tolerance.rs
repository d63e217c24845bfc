// crates/jobcheck-core/tests/timing_tolerance.rs
// ============================================================================
// Module: Timing Tolerance Tests
// Description: Tests for the tolerance formula and timing predicates.
// Purpose: Ensure the shared formula and strict bounds hold exactly.
// Dependencies: jobcheck-core
// ============================================================================

//! ## Overview
//! The tolerance window is `max(expected * pct / 100, min_tolerance_ms)`;
//! approximate matching passes when the absolute difference stays within
//! the window. `less_than` and `greater_than` are strict bounds, so an
//! exactly-equal duration violates both.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use jobcheck_core::TimingAssertion;
use jobcheck_core::TimingConfig;
use jobcheck_core::check_timing;

// ============================================================================
// SECTION: Tolerance Formula
// ============================================================================

/// The percentage term dominates for large expectations.
#[test]
fn percentage_dominates_for_large_values() {
    let config = TimingConfig::default();
    assert_eq!(config.tolerance_for(3_000.0), 1_500.0);
    assert!(config.approximately(3_000.0, 1_500.0));
    assert!(config.approximately(3_000.0, 4_500.0));
    assert!(!config.approximately(3_000.0, 4_501.0));
}

/// The absolute floor dominates for small expectations.
#[test]
fn floor_dominates_for_small_values() {
    let config = TimingConfig::default();
    assert_eq!(config.tolerance_for(50.0), 100.0);
    assert!(config.approximately(50.0, 0.0));
    assert!(config.approximately(50.0, 150.0));
    assert!(!config.approximately(50.0, 151.0));
}

/// A custom tolerance percentage widens or narrows the window.
#[test]
fn custom_percentage_applies() {
    let config = TimingConfig {
        tolerance_pct: 10.0,
        min_tolerance_ms: 0.0,
        ..TimingConfig::default()
    };
    assert!(config.approximately(1_000.0, 1_100.0));
    assert!(!config.approximately(1_000.0, 1_101.0));
}

// ============================================================================
// SECTION: Timing Predicates
// ============================================================================

/// `less_than` is strict: an equal duration fails.
#[test]
fn less_than_is_strict() {
    let assertion = TimingAssertion {
        less_than: Some(100),
        ..TimingAssertion::default()
    };
    let config = TimingConfig::default();
    assert!(check_timing(&assertion, 99, &config).is_empty());
    assert_eq!(check_timing(&assertion, 100, &config).len(), 1);
    assert_eq!(check_timing(&assertion, 101, &config).len(), 1);
}

/// `greater_than` is strict: an equal duration fails.
#[test]
fn greater_than_is_strict() {
    let assertion = TimingAssertion {
        greater_than: Some(100),
        ..TimingAssertion::default()
    };
    let config = TimingConfig::default();
    assert!(check_timing(&assertion, 101, &config).is_empty());
    assert_eq!(check_timing(&assertion, 100, &config).len(), 1);
    assert_eq!(check_timing(&assertion, 99, &config).len(), 1);
}

/// The documented 3000ms approximate window accepts 1500-4500.
#[test]
fn approximate_window_matches_contract() {
    let assertion = TimingAssertion {
        approximate: Some(3_000),
        ..TimingAssertion::default()
    };
    let config = TimingConfig::default();
    assert!(check_timing(&assertion, 1_500, &config).is_empty());
    assert!(check_timing(&assertion, 4_500, &config).is_empty());
    assert_eq!(check_timing(&assertion, 4_501, &config).len(), 1);
    assert_eq!(check_timing(&assertion, 1_499, &config).len(), 1);
}

/// All configured predicates are evaluated; violations accumulate.
#[test]
fn violations_accumulate() {
    let assertion = TimingAssertion {
        less_than: Some(10),
        greater_than: Some(5_000),
        approximate: Some(100),
    };
    let config = TimingConfig::default();
    let violations = check_timing(&assertion, 1_000, &config);
    assert_eq!(violations.len(), 3, "violations: {violations:?}");
    assert!(violations[0].message.contains("< 10ms"));
}
