// crates/jobcheck-core/src/runtime/executor.rs
// ============================================================================
// Module: Jobcheck Step Executor
// Description: Sequential execution of a test's setup, steps, and teardown.
// Purpose: Drive steps through the transport and evaluate their assertions.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! The executor runs one test at a time: setup steps first (a failure there
//! aborts the test with an `error` verdict), then the test steps, then
//! teardown on a best-effort basis. Results are kept in a step-id-keyed
//! context that later steps read through templates. Assertions inside a
//! step are all evaluated; a single failing predicate never short-circuits
//! the rest of the step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;

use crate::core::Assertions;
use crate::core::Failure;
use crate::core::Step;
use crate::core::StepAction;
use crate::core::StepResult;
use crate::core::TestCase;
use crate::core::TestResult;
use crate::core::Verdict;
use crate::core::timing::TimingConfig;
use crate::core::timing::check_timing;
use crate::interfaces::TransportAction;
use crate::interfaces::TransportAdapter;
use crate::runtime::matcher::Mismatch;
use crate::runtime::matcher::match_value;
use crate::runtime::path::resolve_path;
use crate::runtime::template::resolve_matcher_templates;
use crate::runtime::template::resolve_templates;
use crate::runtime::template::resolve_value_templates;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration carried by the executor.
///
/// # Invariants
/// - `timing` is shared by the `~N` matcher and `timing_ms` assertions so
///   both use one tolerance formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineConfig {
    /// Timing tolerance settings.
    pub timing: TimingConfig,
}

// ============================================================================
// SECTION: Step Context
// ============================================================================

/// Per-test state: completed step results keyed by step identifier.
///
/// # Invariants
/// - A step's result is inserted only after the step fully completed,
///   including its assertions, so later steps never observe partial state.
#[derive(Debug, Default)]
pub struct StepContext {
    /// Completed results keyed by step id.
    results: BTreeMap<String, StepResult>,
}

impl StepContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed step result.
    pub fn insert(&mut self, result: StepResult) {
        self.results.insert(result.step_id.to_string(), result);
    }

    /// Returns the result for a step, if it has completed.
    #[must_use]
    pub fn get(&self, step_id: &str) -> Option<&StepResult> {
        self.results.get(step_id)
    }

    /// Returns a step's parsed body when it exists and parsed to JSON.
    #[must_use]
    pub fn parsed_body(&self, step_id: &str) -> Option<&Value> {
        self.results
            .get(step_id)
            .map(|result| &result.parsed)
            .filter(|parsed| !parsed.is_null())
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Executes test cases against a transport adapter.
pub struct Executor<'a> {
    /// Transport adapter the steps are dispatched through.
    adapter: &'a dyn TransportAdapter,
    /// Engine configuration.
    config: EngineConfig,
}

impl<'a> Executor<'a> {
    /// Creates an executor over the given adapter.
    #[must_use]
    pub fn new(adapter: &'a dyn TransportAdapter, config: EngineConfig) -> Self {
        Self {
            adapter,
            config,
        }
    }

    /// Runs a single test case to completion and returns its result.
    ///
    /// Setup failures abort with an `error` verdict; teardown always runs
    /// and never affects the verdict.
    #[must_use]
    pub fn run_test(&self, test: &TestCase) -> TestResult {
        let start = Instant::now();
        let mut context = StepContext::new();
        let mut failures: Vec<Failure> = Vec::new();
        let mut step_results: Vec<StepResult> = Vec::new();
        let mut setup_error: Option<Failure> = None;

        if let Some(setup) = &test.setup {
            for step in &setup.steps {
                let (result, step_failures) = self.execute_step(step, &context);
                context.insert(result);
                if let Some(first) = step_failures.into_iter().next() {
                    setup_error = Some(Failure {
                        step_id: step.id.clone(),
                        message: format!("setup step failed: {}", first.message),
                        ..Failure::default()
                    });
                    break;
                }
            }
        }

        if setup_error.is_none() {
            for step in &test.steps {
                let (result, step_failures) = self.execute_step(step, &context);
                context.insert(result.clone());
                step_results.push(result);
                failures.extend(step_failures);
            }
        }

        // Teardown is best-effort: failures there are discarded.
        if let Some(teardown) = &test.teardown {
            for step in &teardown.steps {
                let (result, _) = self.execute_step(step, &context);
                context.insert(result);
            }
        }

        let verdict = match &setup_error {
            Some(_) => Verdict::Error,
            None if failures.is_empty() => Verdict::Pass,
            None => Verdict::Fail,
        };
        if let Some(failure) = setup_error {
            failures.push(failure);
        }

        TestResult {
            test_id: test.test_id.clone(),
            name: test.name.clone(),
            level: test.level,
            category: test.category.clone(),
            spec_ref: test.spec_ref.clone(),
            verdict,
            duration_ms: millis_since(start),
            failures,
            step_results,
            file_path: test.file_path.clone(),
        }
    }

    /// Executes one step and evaluates its assertions.
    fn execute_step(&self, step: &Step, context: &StepContext) -> (StepResult, Vec<Failure>) {
        if step.delay_ms > 0 {
            sleep_ms(step.delay_ms);
        }

        match step.action {
            StepAction::Wait => {
                let wait_ms = if step.duration_ms > 0 {
                    step.duration_ms
                } else {
                    step.delay_ms
                };
                let wait_ms = wait_ms.min(self.config.timing.max_wait_ms);
                if wait_ms > 0 {
                    sleep_ms(wait_ms);
                }
                (StepResult::empty(step.id.clone()), Vec::new())
            }
            StepAction::Assert => {
                let result = self.synthesize_assert_result(step, context);
                let failures = match &step.assertions {
                    Some(assertions) => {
                        self.evaluate_assertions(step, assertions, &result, context)
                    }
                    None => Vec::new(),
                };
                (result, failures)
            }
            StepAction::Get | StepAction::Post | StepAction::Delete => {
                self.execute_transport_step(step, context)
            }
        }
    }

    /// Builds the asserted document for an ASSERT step.
    ///
    /// The step's own body, structurally template-resolved against the
    /// context, stands in for a response so cross-step operators have
    /// something to navigate.
    fn synthesize_assert_result(&self, step: &Step, context: &StepContext) -> StepResult {
        let mut result = StepResult::empty(step.id.clone());
        if let Some(body) = &step.body {
            let resolved = resolve_value_templates(body, context);
            result.raw_body = resolved.to_string().into_bytes();
            result.parsed = resolved;
        }
        result
    }

    /// Dispatches a request-bearing step through the transport adapter.
    fn execute_transport_step(
        &self,
        step: &Step,
        context: &StepContext,
    ) -> (StepResult, Vec<Failure>) {
        let action = match step.action {
            StepAction::Post => TransportAction::Post,
            StepAction::Delete => TransportAction::Delete,
            _ => TransportAction::Get,
        };

        let path = resolve_templates(step.path.as_deref().unwrap_or_default(), context);
        let body = step
            .body
            .as_ref()
            .map(|body| resolve_templates(&body.to_string(), context));
        let headers = step.headers.clone().unwrap_or_default();

        let result = match self.adapter.execute(action, &path, &headers, body.as_deref()) {
            Ok(response) => {
                let parsed = if response.body.is_empty() {
                    Value::Null
                } else {
                    serde_json::from_slice(&response.body).unwrap_or(Value::Null)
                };
                StepResult {
                    step_id: step.id.clone(),
                    status: response.status,
                    headers: response.headers,
                    raw_body: response.body,
                    parsed,
                    duration_ms: response.duration_ms,
                }
            }
            Err(error) => {
                let synthetic = error.synthetic_body();
                StepResult {
                    step_id: step.id.clone(),
                    status: error.status,
                    headers: crate::core::ResponseHeaders::new(),
                    raw_body: synthetic.to_string().into_bytes(),
                    parsed: synthetic,
                    duration_ms: error.duration_ms,
                }
            }
        };

        let failures = match &step.assertions {
            Some(assertions) => self.evaluate_assertions(step, assertions, &result, context),
            None => Vec::new(),
        };
        (result, failures)
    }

    // ------------------------------------------------------------------
    // Assertion evaluation
    // ------------------------------------------------------------------

    /// Evaluates every assertion of a step, collecting all failures.
    fn evaluate_assertions(
        &self,
        step: &Step,
        assertions: &Assertions,
        result: &StepResult,
        context: &StepContext,
    ) -> Vec<Failure> {
        let timing = &self.config.timing;
        let mut failures = Vec::new();

        if let Some(status_matcher) = &assertions.status
            && let Err(mismatch) = evaluate_status(status_matcher, result.status, timing)
        {
            failures.push(Failure {
                step_id: step.id.clone(),
                field: "status".to_string(),
                expected: status_matcher.to_string(),
                actual: result.status.to_string(),
                message: mismatch.message,
            });
        }

        if !assertions.status_in.is_empty() && !assertions.status_in.contains(&result.status) {
            failures.push(Failure {
                step_id: step.id.clone(),
                field: "status".to_string(),
                expected: format!("one of {:?}", assertions.status_in),
                actual: result.status.to_string(),
                message: format!(
                    "expected status in {:?}, got {}",
                    assertions.status_in, result.status
                ),
            });
        }

        if let Some(body) = &assertions.body {
            self.evaluate_body_assertions(step, body, result, context, &mut failures);
        }

        for path in &assertions.body_absent {
            if let Ok(value) = resolve_path(path, &result.parsed)
                && !value.is_null()
            {
                failures.push(Failure {
                    step_id: step.id.clone(),
                    field: path.clone(),
                    expected: "absent".to_string(),
                    actual: value.to_string(),
                    message: format!("expected field {path:?} to be absent"),
                });
            }
        }

        if let Some(headers) = &assertions.headers {
            for (name, expected) in headers {
                let actual = result.headers.get(name).unwrap_or_default();
                if actual != expected.as_str() {
                    failures.push(Failure {
                        step_id: step.id.clone(),
                        field: format!("header:{name}"),
                        expected: expected.clone(),
                        actual: actual.to_string(),
                        message: format!(
                            "expected header {name:?}={expected:?}, got {actual:?}"
                        ),
                    });
                }
            }
        }

        if let Some(timing_assertion) = &assertions.timing_ms {
            for violation in check_timing(timing_assertion, result.duration_ms, timing) {
                failures.push(Failure {
                    step_id: step.id.clone(),
                    field: "timing".to_string(),
                    expected: violation.expected,
                    actual: violation.actual,
                    message: violation.message,
                });
            }
        }

        if !assertions.body_contains.is_empty() {
            let raw = String::from_utf8_lossy(&result.raw_body);
            for needle in &assertions.body_contains {
                if !raw.contains(needle.as_str()) {
                    failures.push(Failure {
                        step_id: step.id.clone(),
                        field: "body_contains".to_string(),
                        expected: format!("body containing {needle:?}"),
                        actual: String::new(),
                        message: format!("response body does not contain {needle:?}"),
                    });
                }
            }
        }

        failures
    }

    /// Evaluates the body assertion block: the `$empty` sentinel and the
    /// `$or` bundle first, then each ordinary path entry. Keys starting with
    /// `$` but not `$.` are meta-operators and never treated as paths.
    fn evaluate_body_assertions(
        &self,
        step: &Step,
        body: &BTreeMap<String, Value>,
        result: &StepResult,
        context: &StepContext,
        failures: &mut Vec<Failure>,
    ) {
        let timing = &self.config.timing;

        if body.get("$empty").and_then(Value::as_bool) == Some(true)
            && !result.raw_body.is_empty()
            && !result.parsed.is_null()
        {
            failures.push(Failure {
                step_id: step.id.clone(),
                field: "$empty".to_string(),
                expected: "empty body".to_string(),
                actual: String::from_utf8_lossy(&result.raw_body).into_owned(),
                message: "expected response body to be empty or null".to_string(),
            });
        }

        if let Some(Value::Array(alternatives)) = body.get("$or") {
            let matched = alternatives.iter().any(|alternative| {
                let Value::Object(entries) = alternative else {
                    return false;
                };
                entries.iter().all(|(path, matcher)| {
                    let resolved_matcher = resolve_matcher_templates(matcher, context);
                    match resolve_path(path, &result.parsed) {
                        Ok(value) => match_value(&resolved_matcher, &value, timing).is_ok(),
                        Err(_) => false,
                    }
                })
            });
            if !matched {
                failures.push(Failure {
                    step_id: step.id.clone(),
                    field: "$or".to_string(),
                    message: "no $or alternative matched".to_string(),
                    ..Failure::default()
                });
            }
        }

        if result.parsed.is_null() {
            return;
        }

        for (path, matcher) in body {
            if path.starts_with('$') && !path.starts_with("$.") {
                continue;
            }

            let resolved_path = resolve_templates(path, context);
            let resolved_matcher = resolve_matcher_templates(matcher, context);

            let value = match resolve_path(&resolved_path, &result.parsed) {
                Ok(value) => value,
                Err(error) => {
                    // A hard resolution failure is acceptable only when the
                    // entry asserts absence.
                    if resolved_matcher.as_str() == Some("absent") {
                        continue;
                    }
                    failures.push(Failure {
                        step_id: step.id.clone(),
                        field: path.clone(),
                        message: format!("failed to resolve path {path:?}: {error}"),
                        ..Failure::default()
                    });
                    continue;
                }
            };

            if let Err(mismatch) = match_value(&resolved_matcher, &value, timing) {
                failures.push(Failure {
                    step_id: step.id.clone(),
                    field: path.clone(),
                    expected: resolved_matcher.to_string(),
                    actual: value.to_string(),
                    message: format!("assertion failed at {path:?}: {}", mismatch.message),
                });
            }
        }
    }
}

// ============================================================================
// SECTION: Status Assertions
// ============================================================================

/// Evaluates the status predicate: an integer, a matcher string (including
/// the status-only `one_of:` form), or an `{"$in": [...]}` object.
///
/// # Errors
///
/// Returns [`Mismatch`] when the status does not satisfy the predicate.
pub fn evaluate_status(matcher: &Value, actual: u16, timing: &TimingConfig) -> Result<(), Mismatch> {
    if let Some(expected) = matcher.as_i64() {
        return if i64::from(actual) == expected {
            Ok(())
        } else {
            Err(Mismatch::new(
                expected.to_string(),
                actual.to_string(),
                format!("expected status {expected}, got {actual}"),
            ))
        };
    }

    if let Some(token) = matcher.as_str() {
        if let Some(list) = token.strip_prefix("one_of:") {
            for raw_code in list.split(',') {
                let raw_code = raw_code.trim();
                let Ok(code) = raw_code.parse::<u16>() else {
                    return Err(Mismatch::new(
                        token,
                        actual.to_string(),
                        format!("invalid status code {raw_code:?} in one_of matcher"),
                    ));
                };
                if actual == code {
                    return Ok(());
                }
            }
            return Err(Mismatch::new(
                token,
                actual.to_string(),
                format!("expected status one of [{list}], got {actual}"),
            ));
        }
        return match_value(matcher, &Value::from(actual), timing);
    }

    if let Value::Object(map) = matcher
        && let Some(Value::Array(codes)) = map.get("$in")
    {
        let matched = codes
            .iter()
            .filter_map(Value::as_i64)
            .any(|code| code == i64::from(actual));
        return if matched {
            Ok(())
        } else {
            Err(Mismatch::new(
                matcher.to_string(),
                actual.to_string(),
                format!("expected status in {}, got {actual}", Value::Array(codes.clone())),
            ))
        };
    }

    Err(Mismatch::new(
        matcher.to_string(),
        actual.to_string(),
        format!("unknown status assertion format: {matcher}"),
    ))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Sleeps for a number of milliseconds.
fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Elapsed wall time since `start`, in whole milliseconds.
fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
