// crates/jobcheck-core/src/core/schema.rs
// ============================================================================
// Module: Jobcheck Test Schema
// Description: Test case, step, assertion, and result structures.
// Purpose: Define the declarative test format and the engine's outputs.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! The test schema mirrors the on-disk JSON test format one-to-one. Step
//! bodies and assertion matchers are kept as raw [`serde_json::Value`] so
//! that `{{steps...}}` template markers survive until the executor resolves
//! them. Result types aggregate bottom-up: step results into test results,
//! test results into the suite report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::StepId;
use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// A single conformance test loaded from a JSON file.
///
/// # Invariants
/// - Step identifiers are unique across setup, steps, and teardown.
/// - Immutable after loading; the engine never mutates a test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable test identifier.
    pub test_id: TestId,
    /// Conformance level (0-4) this test exercises.
    pub level: u8,
    /// Test category (e.g. `envelope`, `retry`).
    pub category: String,
    /// Human-readable test name.
    pub name: String,
    /// Longer description of the behavior under test.
    #[serde(default)]
    pub description: String,
    /// Reference into the protocol specification.
    #[serde(default)]
    pub spec_ref: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional setup steps run before the test steps.
    #[serde(default)]
    pub setup: Option<StepBlock>,
    /// Ordered test steps.
    pub steps: Vec<Step>,
    /// Optional teardown steps, run best-effort after the test steps.
    #[serde(default)]
    pub teardown: Option<StepBlock>,
    /// Source file path, populated by the loader rather than from JSON.
    #[serde(skip)]
    pub file_path: String,
}

impl TestCase {
    /// Validates structural invariants that must hold before execution.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a step identifier is duplicated anywhere
    /// in the test (setup, steps, or teardown share one namespace).
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for step in self.all_steps() {
            if !seen.insert(step.id.as_str()) {
                return Err(SchemaError::DuplicateStepId {
                    test_id: self.test_id.clone(),
                    step_id: step.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Iterates setup, test, and teardown steps in execution order.
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.setup
            .iter()
            .flat_map(|block| block.steps.iter())
            .chain(self.steps.iter())
            .chain(self.teardown.iter().flat_map(|block| block.steps.iter()))
    }
}

/// Ordered steps inside a setup or teardown block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepBlock {
    /// Steps in declaration order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Schema validation errors raised at load time.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A step identifier appears more than once within one test.
    #[error("test {test_id}: duplicate step id {step_id}")]
    DuplicateStepId {
        /// Test the duplicate occurred in.
        test_id: TestId,
        /// The duplicated step identifier.
        step_id: StepId,
    },
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Action a step performs against the implementation under test.
///
/// # Invariants
/// - Variants are stable for serialization and adapter routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepAction {
    /// Read a resource.
    Get,
    /// Create or mutate a resource.
    Post,
    /// Delete a resource.
    Delete,
    /// Suspend without issuing a request.
    Wait,
    /// Evaluate cross-step assertions without issuing a request.
    Assert,
}

/// A single interaction within a test.
///
/// # Invariants
/// - `body` is kept raw to preserve `{{steps...}}` template markers.
/// - `delay_ms` applies before the action; `duration_ms` only to `WAIT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step identifier, unique within the test.
    pub id: StepId,
    /// Action to perform.
    pub action: StepAction,
    /// Informational intent label, ignored by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Request path (may contain templates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Request body (may contain templates anywhere inside).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Pre-step delay in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
    /// Wait duration in milliseconds (`WAIT` action only).
    #[serde(default)]
    pub duration_ms: u64,
    /// Expected outcomes for this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Assertions>,
    /// Human-readable step description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Expected outcomes for a step.
///
/// # Invariants
/// - `body` keys starting with `$` but not `$.` are meta-operators
///   (`$or`, `$empty`), not path expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assertions {
    /// Status predicate: integer, matcher string, or `{"$in": [...]}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    /// Status must be one of the listed integers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_in: Vec<u16>,
    /// Path-expression to matcher mapping over the parsed body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BTreeMap<String, Value>>,
    /// Paths that must not resolve to a value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_absent: Vec<String>,
    /// Exact-match response headers (names compared case-insensitively).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Response timing predicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<TimingAssertion>,
    /// Substrings that must appear in the raw response body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_contains: Vec<String>,
}

/// Response-time predicates, all in milliseconds.
///
/// # Invariants
/// - `less_than` and `greater_than` are exclusive bounds.
/// - `approximate` uses the engine's timing tolerance formula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingAssertion {
    /// Duration must be strictly below this bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than: Option<u64>,
    /// Duration must be strictly above this bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<u64>,
    /// Duration must fall within tolerance of this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate: Option<u64>,
}

// ============================================================================
// SECTION: Response Headers
// ============================================================================

/// Response headers ordered by first insertion.
///
/// # Invariants
/// - Lookup is case-insensitive on names and returns the first match.
/// - Values are compared case-sensitively by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(Vec<(String, String)>);

impl ResponseHeaders {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a header, preserving insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the first value whose name matches case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates headers in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no headers were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SECTION: Step Result
// ============================================================================

/// Captured outcome of a single executed step.
///
/// # Invariants
/// - `status` is 0 when the step produced no response (WAIT/ASSERT).
/// - `parsed` is `Value::Null` when the raw body was empty or not JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Identifier of the step that produced this result.
    pub step_id: StepId,
    /// Canonical status integer (HTTP-equivalent space).
    pub status: u16,
    /// Response headers in first-insertion order.
    #[serde(default, skip_serializing_if = "ResponseHeaders::is_empty")]
    pub headers: ResponseHeaders,
    /// Raw response body bytes.
    #[serde(skip)]
    pub raw_body: Vec<u8>,
    /// Parsed JSON body, or null when unparseable.
    #[serde(rename = "body", default, skip_serializing_if = "Value::is_null")]
    pub parsed: Value,
    /// Wall-clock duration of the step in milliseconds.
    pub duration_ms: u64,
}

impl StepResult {
    /// Creates an empty result for steps that issue no request.
    #[must_use]
    pub fn empty(step_id: StepId) -> Self {
        Self {
            step_id,
            status: 0,
            headers: ResponseHeaders::new(),
            raw_body: Vec::new(),
            parsed: Value::Null,
            duration_ms: 0,
        }
    }
}

// ============================================================================
// SECTION: Test Result
// ============================================================================

/// Verdict for an executed (or skipped) test case.
///
/// # Invariants
/// - Variants are stable for serialization and report aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every assertion in every step succeeded.
    Pass,
    /// At least one assertion failed.
    Fail,
    /// The engine declined to run the test.
    Skip,
    /// A setup step failed; the test body never ran.
    Error,
}

/// A single assertion failure within a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Step the failure originated from.
    pub step_id: StepId,
    /// Symbolic field: `status`, `timing`, `body_contains`,
    /// `header:<name>`, or a path expression.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    /// Expected value, rendered as a string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expected: String,
    /// Actual value, rendered as a string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actual: String,
    /// Human-readable failure message.
    pub message: String,
}

/// Outcome of running a single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test identifier.
    pub test_id: TestId,
    /// Test name.
    pub name: String,
    /// Conformance level.
    pub level: u8,
    /// Test category.
    pub category: String,
    /// Protocol spec reference.
    #[serde(default)]
    pub spec_ref: String,
    /// Final verdict.
    #[serde(rename = "status")]
    pub verdict: Verdict,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Assertion failures, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
    /// Captured step results, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_results: Vec<StepResult>,
    /// Source file the test was loaded from.
    #[serde(default)]
    pub file_path: String,
}

// ============================================================================
// SECTION: Suite Report
// ============================================================================

/// Aggregate counters for one conformance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Tests at this level.
    pub total: usize,
    /// Passing tests.
    pub passed: usize,
    /// Failing tests.
    pub failed: usize,
    /// Skipped tests.
    pub skipped: usize,
    /// Errored tests.
    pub errored: usize,
    /// True when the level has tests and all of them passed.
    pub all_pass: bool,
}

/// Aggregate counters across the whole suite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Tests executed or skipped.
    pub total: usize,
    /// Passing tests.
    pub passed: usize,
    /// Failing tests.
    pub failed: usize,
    /// Skipped tests.
    pub skipped: usize,
    /// Errored tests.
    pub errored: usize,
    /// Per-level breakdown, keyed by level.
    pub by_level: BTreeMap<u8, LevelSummary>,
}

/// Top-level conformance report.
///
/// # Invariants
/// - `conformant_level` is -1 when no level is fully passing.
/// - `conformant` holds iff no test failed or errored and at least one ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Version of the conformance suite format.
    pub test_suite_version: String,
    /// Target the suite ran against.
    pub target: String,
    /// RFC 3339 timestamp of the run.
    pub run_at: String,
    /// Total suite duration in milliseconds.
    pub duration_ms: u64,
    /// Requested level filter (-1 when all levels ran).
    pub requested_level: i8,
    /// Aggregate counters.
    pub results: ResultsSummary,
    /// True when every selected test passed.
    pub conformant: bool,
    /// Highest fully-passing level, or -1.
    pub conformant_level: i8,
    /// Full results for failed and errored tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TestResult>,
    /// Full results for skipped tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<TestResult>,
}
