// crates/jobcheck-core/tests/template_resolution.rs
// ============================================================================
// Module: Template Resolver Tests
// Description: Tests for cross-step value substitution.
// Purpose: Ensure resolvable references substitute and the rest survive.
// Dependencies: jobcheck-core, serde_json
// ============================================================================

//! ## Overview
//! Verifies textual substitution of `{{steps.<id>.response.body.<path>}}`
//! references: string values substitute as-is, integral numbers drop the
//! decimal point, structured values serialize as JSON, and unresolvable
//! references stay verbatim so reruns remain deterministic.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use jobcheck_core::StepContext;
use jobcheck_core::StepId;
use jobcheck_core::StepResult;
use jobcheck_core::resolve_matcher_templates;
use jobcheck_core::resolve_templates;
use jobcheck_core::resolve_value_templates;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a context holding one completed step with the given parsed body.
fn context_with(step_id: &str, body: Value) -> StepContext {
    let mut context = StepContext::new();
    let mut result = StepResult::empty(StepId::new(step_id));
    result.status = 200;
    result.raw_body = body.to_string().into_bytes();
    result.parsed = body;
    context.insert(result);
    context
}

// ============================================================================
// SECTION: String Substitution
// ============================================================================

/// A resolvable string reference substitutes without quoting.
#[test]
fn string_value_substitutes_as_is() {
    let context = context_with("enqueue", json!({"job": {"id": "abc"}}));
    let resolved = resolve_templates("{{steps.enqueue.response.body.job.id}}", &context);
    assert_eq!(resolved, "abc");
}

/// Templates embedded in a longer string substitute in place.
#[test]
fn embedded_template_in_path() {
    let context = context_with("enqueue", json!({"job": {"id": "abc"}}));
    let resolved = resolve_templates("/jobs/{{steps.enqueue.response.body.job.id}}", &context);
    assert_eq!(resolved, "/jobs/abc");
}

/// Multiple templates in one string each resolve independently.
#[test]
fn multiple_templates_in_one_string() {
    let context = context_with("fetch", json!({"queue": "default", "count": 3}));
    let resolved = resolve_templates(
        "{{steps.fetch.response.body.queue}}:{{steps.fetch.response.body.count}}",
        &context,
    );
    assert_eq!(resolved, "default:3");
}

// ============================================================================
// SECTION: Value Rendering
// ============================================================================

/// Integer-valued numbers emit base-10 without a decimal point.
#[test]
fn integral_number_renders_without_point() {
    let context = context_with("stats", json!({"depth": 42.0}));
    assert_eq!(resolve_templates("{{steps.stats.response.body.depth}}", &context), "42");
}

/// Non-integral numbers render in shortest float form.
#[test]
fn fractional_number_renders_shortest() {
    let context = context_with("stats", json!({"rate": 1.5}));
    assert_eq!(resolve_templates("{{steps.stats.response.body.rate}}", &context), "1.5");
}

/// Structured values serialize as compact JSON.
#[test]
fn structured_value_renders_as_json() {
    let context = context_with("fetch", json!({"jobs": [{"id": "a"}]}));
    assert_eq!(
        resolve_templates("{{steps.fetch.response.body.jobs}}", &context),
        "[{\"id\":\"a\"}]"
    );
}

// ============================================================================
// SECTION: Soft Non-Resolution
// ============================================================================

/// References to unknown steps survive verbatim.
#[test]
fn unknown_step_survives() {
    let context = StepContext::new();
    let input = "{{steps.ghost.response.body.job.id}}";
    assert_eq!(resolve_templates(input, &context), input);
}

/// References whose path resolves to null survive verbatim.
#[test]
fn null_resolution_survives() {
    let context = context_with("enqueue", json!({"job": {}}));
    let input = "{{steps.enqueue.response.body.job.id}}";
    assert_eq!(resolve_templates(input, &context), input);
}

/// Text without the template marker is returned untouched.
#[test]
fn plain_text_passes_through() {
    let context = StepContext::new();
    assert_eq!(resolve_templates("/jobs/batch", &context), "/jobs/batch");
}

// ============================================================================
// SECTION: Matcher Templates
// ============================================================================

/// Matchers containing a reference resolve lazily into new values.
#[test]
fn matcher_template_resolves() {
    let context = context_with("enqueue", json!({"job": {"id": "abc"}}));
    let matcher = json!("{{steps.enqueue.response.body.job.id}}");
    assert_eq!(resolve_matcher_templates(&matcher, &context), json!("abc"));
}

/// Matchers without the marker are returned unchanged.
#[test]
fn matcher_without_marker_unchanged() {
    let context = StepContext::new();
    let matcher = json!({"$in": [200, 201]});
    assert_eq!(resolve_matcher_templates(&matcher, &context), matcher);
}

/// Unresolvable matcher references leave the matcher unchanged.
#[test]
fn matcher_with_unresolvable_reference_unchanged() {
    let context = StepContext::new();
    let matcher = json!("{{steps.ghost.response.body.id}}");
    assert_eq!(resolve_matcher_templates(&matcher, &context), matcher);
}

/// A template inside a JSON string stays a valid JSON string.
#[test]
fn matcher_substitution_stays_inside_string_literal() {
    let context = context_with("stats", json!({"depth": 3}));
    let matcher = json!("{{steps.stats.response.body.depth}}");
    assert_eq!(resolve_matcher_templates(&matcher, &context), json!("3"));
}

// ============================================================================
// SECTION: Structural Templates
// ============================================================================

/// A whole-string reference substitutes the referenced value itself.
#[test]
fn structural_resolution_preserves_value_types() {
    let context = context_with("fetch", json!({"jobs": ["a", "b"], "count": 2}));
    let body = json!({
        "seen": "{{steps.fetch.response.body.jobs}}",
        "total": "{{steps.fetch.response.body.count}}",
        "label": "jobs: {{steps.fetch.response.body.count}}"
    });

    let resolved = resolve_value_templates(&body, &context);

    assert_eq!(resolved["seen"], json!(["a", "b"]), "arrays survive intact");
    assert_eq!(resolved["total"], json!(2), "numbers keep their type");
    assert_eq!(resolved["label"], json!("jobs: 2"), "embedded references stay textual");
}

/// Unresolvable whole-string references survive as the original string.
#[test]
fn structural_resolution_is_soft() {
    let context = StepContext::new();
    let body = json!(["{{steps.ghost.response.body.jobs}}", 7]);
    assert_eq!(resolve_value_templates(&body, &context), body);
}
