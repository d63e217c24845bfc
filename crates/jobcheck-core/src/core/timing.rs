// crates/jobcheck-core/src/core/timing.rs
// ============================================================================
// Module: Jobcheck Timing
// Description: Tolerance configuration and timing predicate evaluation.
// Purpose: Share one tolerance formula between matchers and timing asserts.
// Dependencies: crate::core::schema
// ============================================================================

//! ## Overview
//! Approximate timing uses a percentage tolerance with an absolute floor so
//! small expected values still have a workable window:
//! `tolerance = max(expected * pct / 100, min_tolerance_ms)`. A value is
//! approximately equal when its absolute difference from the expected value
//! does not exceed the tolerance. The `less_than` / `greater_than` bounds
//! are strict by contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::schema::TimingAssertion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default percentage tolerance for approximate timing assertions.
pub const DEFAULT_TOLERANCE_PCT: f64 = 50.0;
/// Default absolute tolerance floor in milliseconds.
pub const DEFAULT_MIN_TOLERANCE_MS: f64 = 100.0;
/// Default upper bound for wait durations in milliseconds.
pub const DEFAULT_MAX_WAIT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Timing Configuration
// ============================================================================

/// Tolerance settings for approximate timing checks.
///
/// # Invariants
/// - `tolerance_pct` is interpreted as a percentage of the expected value.
/// - `min_tolerance_ms` is an absolute floor applied after the percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Percentage tolerance for approximate assertions.
    pub tolerance_pct: f64,
    /// Minimum absolute tolerance in milliseconds.
    pub min_tolerance_ms: f64,
    /// Maximum wait duration honored by WAIT steps, in milliseconds.
    pub max_wait_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
            min_tolerance_ms: DEFAULT_MIN_TOLERANCE_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
        }
    }
}

impl TimingConfig {
    /// Computes the tolerance window for an expected value.
    #[must_use]
    pub fn tolerance_for(&self, expected: f64) -> f64 {
        (expected * self.tolerance_pct / 100.0).max(self.min_tolerance_ms)
    }

    /// Returns true when `actual` is within tolerance of `expected`.
    #[must_use]
    pub fn approximately(&self, expected: f64, actual: f64) -> bool {
        (actual - expected).abs() <= self.tolerance_for(expected)
    }
}

// ============================================================================
// SECTION: Timing Outcomes
// ============================================================================

/// A single timing predicate violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingViolation {
    /// Expected bound, rendered for reporting.
    pub expected: String,
    /// Observed duration, rendered for reporting.
    pub actual: String,
    /// Human-readable message.
    pub message: String,
}

/// Evaluates every configured timing predicate against an observed duration.
///
/// All predicates are checked; violations accumulate rather than
/// short-circuiting.
#[must_use]
pub fn check_timing(
    assertion: &TimingAssertion,
    duration_ms: u64,
    config: &TimingConfig,
) -> Vec<TimingViolation> {
    let mut violations = Vec::new();

    if let Some(bound) = assertion.less_than
        && duration_ms >= bound
    {
        violations.push(TimingViolation {
            expected: format!("< {bound}ms"),
            actual: format!("{duration_ms}ms"),
            message: format!("expected response in < {bound}ms, took {duration_ms}ms"),
        });
    }

    if let Some(bound) = assertion.greater_than
        && duration_ms <= bound
    {
        violations.push(TimingViolation {
            expected: format!("> {bound}ms"),
            actual: format!("{duration_ms}ms"),
            message: format!("expected response in > {bound}ms, took {duration_ms}ms"),
        });
    }

    if let Some(expected) = assertion.approximate {
        let expected_ms = expected as f64;
        let actual_ms = duration_ms as f64;
        if !config.approximately(expected_ms, actual_ms) {
            let tolerance = config.tolerance_for(expected_ms);
            let diff = (actual_ms - expected_ms).abs();
            violations.push(TimingViolation {
                expected: format!("~{expected}ms (tolerance {tolerance:.0}ms)"),
                actual: format!("{duration_ms}ms"),
                message: format!(
                    "expected ~{expected}ms (tolerance {tolerance:.0}ms), got {duration_ms}ms (diff {diff:.0}ms)"
                ),
            });
        }
    }

    violations
}
