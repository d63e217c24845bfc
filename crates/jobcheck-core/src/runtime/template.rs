// crates/jobcheck-core/src/runtime/template.rs
// ============================================================================
// Module: Jobcheck Template Resolver
// Description: Cross-step value substitution for paths, bodies, and matchers.
// Purpose: Thread earlier step responses into later steps, softly.
// Dependencies: crate::runtime::{executor, path, render}, regex
// ============================================================================

//! ## Overview
//! Templates take the form `{{steps.<STEP_ID>.response.body.<FIELD_PATH>}}`
//! and substitute values from earlier step responses. Substitution is purely
//! textual and happens before any JSON re-parsing, so a template inside a
//! JSON string literal stays a valid JSON string. Non-resolution is soft by
//! contract: an unknown step, a failed path, or a null value leaves the
//! token untouched so reruns stay deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;
use serde_json::Value;

use crate::runtime::executor::StepContext;
use crate::runtime::path::resolve_path;
use crate::runtime::render::render_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker that cheaply detects template candidates before regex work.
pub const TEMPLATE_MARKER: &str = "{{steps.";

static TEMPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(template_pattern);

/// Compiles the fixed template reference pattern.
#[allow(clippy::expect_used, reason = "The template pattern is fixed and known to compile.")]
fn template_pattern() -> Regex {
    Regex::new(r"\{\{steps\.([^.]+)\.response\.body\.([^}]+)\}\}")
        .expect("template pattern must compile")
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Substitutes every resolvable template reference in a string.
///
/// References that cannot be resolved survive verbatim.
#[must_use]
pub fn resolve_templates(input: &str, context: &StepContext) -> String {
    if !input.contains(TEMPLATE_MARKER) {
        return input.to_string();
    }
    TEMPLATE_PATTERN
        .replace_all(input, |caps: &Captures<'_>| {
            let step_id = &caps[1];
            let field_path = &caps[2];
            substitute(step_id, field_path, context).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolves template references inside an assertion matcher value.
///
/// The matcher is only rendered and re-parsed when its raw text carries the
/// template marker; otherwise it is returned unchanged.
#[must_use]
pub fn resolve_matcher_templates(matcher: &Value, context: &StepContext) -> Value {
    let raw = matcher.to_string();
    if !raw.contains(TEMPLATE_MARKER) {
        return matcher.clone();
    }
    let resolved = resolve_templates(&raw, context);
    if resolved == raw {
        return matcher.clone();
    }
    serde_json::from_str(&resolved).unwrap_or_else(|_| matcher.clone())
}

/// Resolves templates inside a JSON value structurally.
///
/// A string that is exactly one template reference is replaced by the
/// referenced value itself, so arrays and objects survive substitution
/// intact; any other string gets ordinary textual substitution. ASSERT
/// steps use this to build their asserted document.
#[must_use]
pub fn resolve_value_templates(value: &Value, context: &StepContext) -> Value {
    match value {
        Value::String(text) => {
            if let Some(referenced) = whole_reference(text, context) {
                return referenced;
            }
            Value::String(resolve_templates(text, context))
        }
        Value::Array(items) => Value::Array(
            items.iter().map(|item| resolve_value_templates(item, context)).collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), resolve_value_templates(field, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Resolves a string that is exactly one template reference.
fn whole_reference(text: &str, context: &StepContext) -> Option<Value> {
    let captures = TEMPLATE_PATTERN.captures(text)?;
    let whole = captures.get(0)?;
    if whole.start() != 0 || whole.end() != text.len() {
        return None;
    }
    let parsed = context.parsed_body(&captures[1])?;
    let value = resolve_path(&captures[2], parsed).ok()?;
    if value.is_null() {
        return None;
    }
    Some(value)
}

/// Looks up one reference, rendering the value for textual substitution.
fn substitute(step_id: &str, field_path: &str, context: &StepContext) -> Option<String> {
    let parsed = context.parsed_body(step_id)?;
    let value = resolve_path(field_path, parsed).ok()?;
    if value.is_null() {
        return None;
    }
    Some(render_value(&value))
}
