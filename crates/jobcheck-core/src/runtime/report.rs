// crates/jobcheck-core/src/runtime/report.rs
// ============================================================================
// Module: Jobcheck Report Aggregator
// Description: Suite report derivation from per-test results.
// Purpose: Classify verdicts and derive the highest fully-passing level.
// Dependencies: crate::core, time
// ============================================================================

//! ## Overview
//! The aggregator folds test results into suite and per-level counters. A
//! level is `all_pass` when it has at least one test and every one of them
//! passed. The conformant level walks levels 0 through 4 and stops at the
//! first level that is unrepresented or not fully passing; the result is the
//! last level that was fully passing before the stop, or -1 when none was.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::LevelSummary;
use crate::core::ResultsSummary;
use crate::core::SuiteReport;
use crate::core::TestResult;
use crate::core::Verdict;
use crate::core::level::MAX_LEVEL;
use crate::core::level::MIN_LEVEL;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version of the conformance suite report format.
pub const TEST_SUITE_VERSION: &str = "1.0";

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Builds the suite report from executed test results.
///
/// `requested_level` is the level filter the run was invoked with, or -1
/// when all levels were selected.
#[must_use]
pub fn build_report(
    results: Vec<TestResult>,
    target: &str,
    requested_level: i8,
    duration_ms: u64,
) -> SuiteReport {
    let mut summary = ResultsSummary {
        total: results.len(),
        ..ResultsSummary::default()
    };
    let mut failures = Vec::new();
    let mut skipped = Vec::new();

    for result in &results {
        let level = summary.by_level.entry(result.level).or_insert_with(LevelSummary::default);
        level.total += 1;
        match result.verdict {
            Verdict::Pass => {
                summary.passed += 1;
                level.passed += 1;
            }
            Verdict::Fail => {
                summary.failed += 1;
                level.failed += 1;
                failures.push(result.clone());
            }
            Verdict::Skip => {
                summary.skipped += 1;
                level.skipped += 1;
                skipped.push(result.clone());
            }
            Verdict::Error => {
                summary.errored += 1;
                level.errored += 1;
                failures.push(result.clone());
            }
        }
    }

    for level in summary.by_level.values_mut() {
        level.all_pass = level.total > 0 && level.passed == level.total;
    }

    let conformant_level = conformant_level(&summary);
    let conformant = summary.failed == 0 && summary.errored == 0 && summary.total > 0;

    SuiteReport {
        test_suite_version: TEST_SUITE_VERSION.to_string(),
        target: target.to_string(),
        run_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        duration_ms,
        requested_level,
        results: summary,
        conformant,
        conformant_level,
        failures,
        skipped,
    }
}

/// Walks levels 0..=4 and returns the last fully-passing level before the
/// first unrepresented or failing one, or -1.
fn conformant_level(summary: &ResultsSummary) -> i8 {
    let mut conformant: i8 = -1;
    for level in MIN_LEVEL..=MAX_LEVEL {
        let Some(entry) = summary.by_level.get(&level) else {
            break;
        };
        if !entry.all_pass {
            break;
        }
        conformant = level as i8;
    }
    conformant
}
