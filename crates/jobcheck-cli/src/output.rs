// crates/jobcheck-cli/src/output.rs
// ============================================================================
// Module: Report Output
// Description: Table and JSON renderers for the suite report.
// Purpose: Present results for humans and machines without a logging stack.
// Dependencies: jobcheck-core, serde_json
// ============================================================================

//! ## Overview
//! The table renderer writes a banner, per-test rows with inline failure
//! lines, a per-level summary, and the final conformance verdict. The JSON
//! renderer emits the report with two-space indentation. Both write to any
//! `io::Write` so tests can capture their output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;

use jobcheck_core::SuiteReport;
use jobcheck_core::TestResult;
use jobcheck_core::Verdict;
use jobcheck_core::level_name;

// ============================================================================
// SECTION: JSON Output
// ============================================================================

/// Writes the report as indented JSON.
///
/// # Errors
///
/// Returns an [`io::Error`] when writing fails.
pub fn write_json(report: &SuiteReport, out: &mut impl Write) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(out, "{rendered}")
}

// ============================================================================
// SECTION: Table Output
// ============================================================================

/// Writes a human-readable results table.
///
/// # Errors
///
/// Returns an [`io::Error`] when writing fails.
pub fn write_table(
    report: &SuiteReport,
    results: &[TestResult],
    verbose: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "========================================")?;
    writeln!(out, "  Job Queue Conformance Test Results")?;
    writeln!(out, "========================================")?;
    writeln!(out, "  Target:    {}", report.target)?;
    writeln!(out, "  Suite:     v{}", report.test_suite_version)?;
    writeln!(out, "  Run at:    {}", report.run_at)?;
    writeln!(out, "  Duration:  {}ms", report.duration_ms)?;
    writeln!(out, "----------------------------------------")?;

    writeln!(out)?;
    writeln!(out, "  {:<14} {:<40} {:<8} DURATION", "TEST ID", "NAME", "STATUS")?;
    writeln!(out, "  {:-<14} {:-<40} {:-<8} {:-<10}", "", "", "", "")?;

    for result in results {
        let status = verdict_label(result.verdict);
        let name = truncate(&result.name, 40);
        writeln!(
            out,
            "  {:<14} {:<40} {:<8} {}ms",
            result.test_id, name, status, result.duration_ms
        )?;

        if matches!(result.verdict, Verdict::Fail | Verdict::Error) {
            for failure in &result.failures {
                writeln!(out, "    -> [{}] {}", failure.step_id, failure.message)?;
                if verbose && !failure.expected.is_empty() {
                    writeln!(out, "       Expected: {}", failure.expected)?;
                    writeln!(out, "       Actual:   {}", failure.actual)?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "  Level Summary:")?;
    writeln!(
        out,
        "  {:<8} {:<15} {:>6} {:>6} {:>6} {:>6} {:>8}",
        "LEVEL", "NAME", "TOTAL", "PASS", "FAIL", "SKIP", "STATUS"
    )?;
    for (level, summary) in &report.results.by_level {
        let status = if summary.all_pass { "PASS" } else { "FAIL" };
        writeln!(
            out,
            "  {:<8} {:<15} {:>6} {:>6} {:>6} {:>6} {:>8}",
            level,
            level_name(*level),
            summary.total,
            summary.passed,
            summary.failed,
            summary.skipped,
            status
        )?;
    }

    writeln!(out)?;
    writeln!(out, "  ----------------------------------------")?;
    writeln!(
        out,
        "  Total: {} | Passed: {} | Failed: {} | Skipped: {} | Errored: {}",
        report.results.total,
        report.results.passed,
        report.results.failed,
        report.results.skipped,
        report.results.errored
    )?;

    if report.conformant {
        writeln!(
            out,
            "  Result: CONFORMANT (Level {} - {})",
            report.conformant_level,
            conformant_level_name(report.conformant_level)
        )?;
    } else if report.conformant_level >= 0 {
        writeln!(
            out,
            "  Result: PARTIAL CONFORMANCE (Level {} - {})",
            report.conformant_level,
            conformant_level_name(report.conformant_level)
        )?;
    } else {
        writeln!(out, "  Result: NOT CONFORMANT")?;
    }
    writeln!(out, "========================================")?;
    writeln!(out)?;

    if !report.failures.is_empty() {
        writeln!(out, "  Failed Tests ({}):", report.failures.len())?;
        for failed in &report.failures {
            writeln!(out, "    - {}: {} [{}]", failed.test_id, failed.name, failed.spec_ref)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a verdict to its table label.
const fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
        Verdict::Skip => "SKIP",
        Verdict::Error => "ERR",
    }
}

/// Resolves a level name, tolerating the -1 sentinel.
fn conformant_level_name(level: i8) -> &'static str {
    u8::try_from(level).map_or("Unknown", level_name)
}

/// Truncates a name to fit the table column.
fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let cut: String = name.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        name.to_string()
    }
}
