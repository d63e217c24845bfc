// crates/jobcheck-core/src/runtime/matcher.rs
// ============================================================================
// Module: Jobcheck Matcher Evaluator
// Description: Recursive predicate engine over dynamically-typed JSON values.
// Purpose: Decide declarative matcher expressions without ever panicking.
// Dependencies: crate::core::timing, crate::runtime::render, regex, serde_json
// ============================================================================

//! ## Overview
//! A matcher is itself a JSON value, interpreted by type: the literal null
//! matches only null, strings dispatch through the token table, numbers and
//! booleans compare against like-typed values, arrays match element-wise,
//! and objects are either operator objects (`$exists`, `$match`, `$in`,
//! `$size`, `$or`, `$empty`, `range`) or field-wise predicates. The null
//! case must run first or a null matcher would be accepted as the zero value
//! of the other types.
//!
//! Every evaluation returns success or a structured [`Mismatch`]; no input,
//! however malformed, raises.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;

use crate::core::timing::TimingConfig;
use crate::runtime::render::render_value;

// ============================================================================
// SECTION: Patterns
// ============================================================================

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    builtin_pattern(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
});

static UUID_V7_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    builtin_pattern(r"^[0-9a-f]{8}-[0-9a-f]{4}-7[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
});

static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    builtin_pattern(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
});

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    builtin_pattern(r"^number:range\((-?\d+(?:\.\d+)?),\s*(-?\d+(?:\.\d+)?)\)$")
});

static LENGTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| builtin_pattern(r"^array:length\((\d+)\)$"));

static APPROX_PATTERN: LazyLock<Regex> = LazyLock::new(|| builtin_pattern(r"^~(\d+(?:\.\d+)?)$"));

/// Compiles a built-in pattern.
#[allow(clippy::expect_used, reason = "Built-in patterns are fixed and known to compile.")]
fn builtin_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in matcher pattern must compile")
}

// ============================================================================
// SECTION: Mismatch
// ============================================================================

/// Structured mismatch describing why a matcher rejected a value.
///
/// # Invariants
/// - `expected` and `actual` are rendered strings suitable for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Expected value or predicate, rendered.
    pub expected: String,
    /// Actual value, rendered.
    pub actual: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Mismatch {
    /// Creates a mismatch with rendered expected/actual forms.
    #[must_use]
    pub fn new(
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            message: message.into(),
        }
    }

    /// Prefixes the message with positional context (array index, field).
    #[must_use]
    fn contextualize(mut self, context: &str) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}

/// Outcome of a matcher evaluation.
pub type MatchOutcome = Result<(), Mismatch>;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Matches a declarative matcher against an actual JSON value.
///
/// A null (or missing) actual value is represented as [`Value::Null`].
///
/// # Errors
///
/// Returns [`Mismatch`] when the value does not satisfy the matcher.
pub fn match_value(matcher: &Value, actual: &Value, timing: &TimingConfig) -> MatchOutcome {
    match matcher {
        // Null must dispatch before the typed cases: a null matcher is not
        // the zero value of string/number/boolean.
        Value::Null => {
            if actual.is_null() {
                Ok(())
            } else {
                Err(Mismatch::new(
                    "null",
                    describe(actual),
                    format!("expected null, got {}", describe(actual)),
                ))
            }
        }
        Value::String(token) => match_string_token(token, actual, timing),
        Value::Number(expected) => match_number(expected.as_f64(), actual),
        Value::Bool(expected) => match_boolean(*expected, actual),
        Value::Array(expected) => match_array(expected, actual, timing),
        Value::Object(expected) => match_object(expected, actual, timing),
    }
}

// ============================================================================
// SECTION: String Matchers
// ============================================================================

/// Dispatches the string matcher token table.
fn match_string_token(token: &str, actual: &Value, timing: &TimingConfig) -> MatchOutcome {
    match token {
        "any" | "exists" => {
            return if actual.is_null() {
                Err(Mismatch::new(
                    token,
                    "null",
                    "expected field to exist, but it is missing",
                ))
            } else {
                Ok(())
            };
        }
        "absent" => {
            return if actual.is_null() {
                Ok(())
            } else {
                Err(Mismatch::new(
                    token,
                    describe(actual),
                    format!("expected field to be absent, but got {}", describe(actual)),
                ))
            };
        }
        "string:nonempty" | "string:non_empty" => {
            let text = require_string(token, actual, "non-empty string")?;
            return if text.is_empty() {
                Err(Mismatch::new(
                    token,
                    "\"\"",
                    "expected non-empty string, got empty string",
                ))
            } else {
                Ok(())
            };
        }
        "string:uuid" => return match_pattern_token(token, &UUID_PATTERN, actual, "valid UUID"),
        "string:uuidv7" => {
            return match_pattern_token(token, &UUID_V7_PATTERN, actual, "valid UUIDv7");
        }
        "string:datetime" => {
            return match_pattern_token(token, &DATETIME_PATTERN, actual, "RFC 3339 datetime");
        }
        "number:positive" => {
            let number = require_number(token, actual, "positive number")?;
            return if number > 0.0 {
                Ok(())
            } else {
                Err(Mismatch::new(
                    token,
                    render_value(actual),
                    format!("expected positive number, got {number}"),
                ))
            };
        }
        "number:non_negative" => {
            let number = require_number(token, actual, "non-negative number")?;
            return if number >= 0.0 {
                Ok(())
            } else {
                Err(Mismatch::new(
                    token,
                    render_value(actual),
                    format!("expected non-negative number, got {number}"),
                ))
            };
        }
        "array:nonempty" => {
            let items = require_array(token, actual, "non-empty array")?;
            return if items.is_empty() {
                Err(Mismatch::new(token, "[]", "expected non-empty array, got empty array"))
            } else {
                Ok(())
            };
        }
        "array:empty" => {
            let items = require_array(token, actual, "empty array")?;
            return if items.is_empty() {
                Ok(())
            } else {
                Err(Mismatch::new(
                    token,
                    render_value(actual),
                    format!("expected empty array, got array with {} elements", items.len()),
                ))
            };
        }
        _ => {}
    }

    if let Some(rest) = token.strip_prefix("array:min_length:") {
        return match_min_length(token, rest, actual);
    }
    if let Some(rest) = token.strip_prefix("array:min:") {
        return match_min_length(token, rest, actual);
    }
    if let Some(rest) = token.strip_prefix("array:length:") {
        return match_exact_length(token, rest, actual);
    }
    if let Some(target) = token.strip_prefix("contains:") {
        let items = require_array(token, actual, "array for contains check")?;
        return if items.iter().any(|item| render_value(item) == target) {
            Ok(())
        } else {
            Err(Mismatch::new(
                token,
                render_value(actual),
                format!("expected array to contain {target:?}, but it was not found"),
            ))
        };
    }
    if let Some(target) = token.strip_prefix("not_contains:") {
        let items = require_array(token, actual, "array for not_contains check")?;
        return if items.iter().any(|item| render_value(item) == target) {
            Err(Mismatch::new(
                token,
                render_value(actual),
                format!("expected array to not contain {target:?}, but it was found"),
            ))
        } else {
            Ok(())
        };
    }
    if let Some(needle) = token.strip_prefix("string:contains:") {
        let text = require_string(token, actual, "string")?;
        return if text.contains(needle) {
            Ok(())
        } else {
            Err(Mismatch::new(
                token,
                text.to_string(),
                format!("expected string containing {needle:?}, got {text:?}"),
            ))
        };
    }

    if let Some(captures) = RANGE_PATTERN.captures(token) {
        let low: f64 = captures[1].parse().unwrap_or(0.0);
        let high: f64 = captures[2].parse().unwrap_or(0.0);
        let number = require_number(token, actual, "number in range")?;
        return if number < low || number > high {
            Err(Mismatch::new(
                token,
                render_value(actual),
                format!("expected number in range [{low}, {high}], got {number}"),
            ))
        } else {
            Ok(())
        };
    }
    if let Some(captures) = LENGTH_PATTERN.captures(token) {
        return match_exact_length(token, &captures[1], actual);
    }
    if let Some(captures) = APPROX_PATTERN.captures(token) {
        let expected: f64 = captures[1].parse().unwrap_or(0.0);
        let number = require_number(token, actual, "approximate number")?;
        return if timing.approximately(expected, number) {
            Ok(())
        } else {
            let tolerance = timing.tolerance_for(expected);
            Err(Mismatch::new(
                token,
                render_value(actual),
                format!(
                    "expected ~{expected} (tolerance {tolerance}), got {number} (diff: {})",
                    (number - expected).abs()
                ),
            ))
        };
    }
    if let Some(inner) = token.strip_prefix("string:pattern(")
        && let Some(pattern) = inner.strip_suffix(')')
    {
        let text = require_string(token, actual, "string")?;
        let Ok(compiled) = Regex::new(pattern) else {
            return Err(Mismatch::new(
                token,
                describe(actual),
                format!("invalid regex pattern {pattern:?}"),
            ));
        };
        return if compiled.is_match(text) {
            Ok(())
        } else {
            Err(Mismatch::new(
                token,
                text.to_string(),
                format!("expected string matching pattern {pattern:?}, got {text:?}"),
            ))
        };
    }

    // Anything else is a literal string comparison.
    let text = require_string(token, actual, "string")?;
    if text == token {
        Ok(())
    } else {
        Err(Mismatch::new(
            token,
            text.to_string(),
            format!("expected {token:?}, got {text:?}"),
        ))
    }
}

/// Matches a fixed-pattern string token.
fn match_pattern_token(
    token: &str,
    pattern: &Regex,
    actual: &Value,
    expectation: &str,
) -> MatchOutcome {
    let text = require_string(token, actual, expectation)?;
    if pattern.is_match(text) {
        Ok(())
    } else {
        Err(Mismatch::new(
            token,
            text.to_string(),
            format!("expected {expectation}, got {text:?}"),
        ))
    }
}

/// Matches `array:min_length:N` / `array:min:N` tokens.
fn match_min_length(token: &str, raw_len: &str, actual: &Value) -> MatchOutcome {
    let Ok(min) = raw_len.parse::<usize>() else {
        return Err(Mismatch::new(
            token,
            describe(actual),
            format!("invalid array length value {raw_len:?}"),
        ));
    };
    let items = require_array(token, actual, "array")?;
    if items.len() < min {
        Err(Mismatch::new(
            token,
            render_value(actual),
            format!("expected array with at least {min} elements, got {}", items.len()),
        ))
    } else {
        Ok(())
    }
}

/// Matches `array:length:N` / `array:length(N)` tokens.
fn match_exact_length(token: &str, raw_len: &str, actual: &Value) -> MatchOutcome {
    let Ok(expected) = raw_len.parse::<usize>() else {
        return Err(Mismatch::new(
            token,
            describe(actual),
            format!("invalid array length value {raw_len:?}"),
        ));
    };
    let items = require_array(token, actual, "array")?;
    if items.len() == expected {
        Ok(())
    } else {
        Err(Mismatch::new(
            token,
            render_value(actual),
            format!("expected array of length {expected}, got length {}", items.len()),
        ))
    }
}

// ============================================================================
// SECTION: Number / Boolean / Array Matchers
// ============================================================================

/// Matches a numeric matcher: integer-exact when both sides are integral,
/// otherwise equal within 1e-9.
fn match_number(expected: Option<f64>, actual: &Value) -> MatchOutcome {
    let Some(expected) = expected else {
        return Err(Mismatch::new(
            "number",
            describe(actual),
            "matcher number is not representable",
        ));
    };
    let Some(number) = as_f64(actual) else {
        return Err(Mismatch::new(
            format!("{expected}"),
            describe(actual),
            format!("expected number {expected}, got {}", describe(actual)),
        ));
    };
    if expected == expected.trunc() && number == number.trunc() {
        if expected as i64 == number as i64 {
            return Ok(());
        }
        return Err(Mismatch::new(
            format!("{expected}"),
            format!("{number}"),
            format!("expected {expected}, got {number}"),
        ));
    }
    if (expected - number).abs() > 1e-9 {
        return Err(Mismatch::new(
            format!("{expected}"),
            format!("{number}"),
            format!("expected {expected}, got {number}"),
        ));
    }
    Ok(())
}

/// Matches a boolean matcher.
fn match_boolean(expected: bool, actual: &Value) -> MatchOutcome {
    match actual {
        Value::Bool(value) if *value == expected => Ok(()),
        Value::Bool(value) => Err(Mismatch::new(
            expected.to_string(),
            value.to_string(),
            format!("expected {expected}, got {value}"),
        )),
        other => Err(Mismatch::new(
            expected.to_string(),
            describe(other),
            format!("expected boolean {expected}, got {}", describe(other)),
        )),
    }
}

/// Matches an array matcher element-wise against an actual array.
fn match_array(expected: &[Value], actual: &Value, timing: &TimingConfig) -> MatchOutcome {
    let Value::Array(items) = actual else {
        return Err(Mismatch::new(
            "array",
            describe(actual),
            format!("expected array, got {}", describe(actual)),
        ));
    };
    if items.len() != expected.len() {
        return Err(Mismatch::new(
            format!("array of length {}", expected.len()),
            format!("length {}", items.len()),
            format!("expected array of length {}, got length {}", expected.len(), items.len()),
        ));
    }
    for (index, (matcher, item)) in expected.iter().zip(items).enumerate() {
        match_value(matcher, item, timing)
            .map_err(|mismatch| mismatch.contextualize(&format!("[{index}]")))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Object Matchers
// ============================================================================

/// Classifies an object matcher by its first recognized operator key, or
/// falls back to a field-wise predicate.
fn match_object(expected: &Map<String, Value>, actual: &Value, timing: &TimingConfig) -> MatchOutcome {
    if expected.contains_key("$exists") {
        return match_exists_operator(expected, actual);
    }
    if let Some(pattern) = expected.get("$match") {
        return match_regex_operator(pattern, actual);
    }
    if let Some(alternatives) = expected.get("$in") {
        return match_any_of(alternatives, actual, timing, "$in");
    }
    if let Some(size) = expected.get("$size") {
        return match_size_operator(size, actual);
    }
    if let Some(alternatives) = expected.get("$or") {
        return match_any_of(alternatives, actual, timing, "$or");
    }
    if expected.contains_key("$empty") {
        // The meaningful $empty check happens at the body-assertion level;
        // reaching the matcher it is a pass for any value.
        return Ok(());
    }
    if let Some(range) = expected.get("range") {
        return match_range_operator(range, actual);
    }

    match_fields(expected, actual, timing)
}

/// Evaluates `$exists` (with optional `$type`) against a value.
fn match_exists_operator(expected: &Map<String, Value>, actual: &Value) -> MatchOutcome {
    let Some(Value::Bool(must_exist)) = expected.get("$exists") else {
        return Err(Mismatch::new(
            "$exists",
            describe(actual),
            "invalid $exists value: expected a boolean",
        ));
    };

    if *must_exist && actual.is_null() {
        return Err(Mismatch::new(
            "$exists: true",
            "null",
            "expected field to exist, but it is missing",
        ));
    }
    if !*must_exist && !actual.is_null() {
        return Err(Mismatch::new(
            "$exists: false",
            describe(actual),
            format!("expected field to not exist, but got {}", describe(actual)),
        ));
    }

    if let Some(Value::String(expected_type)) = expected.get("$type") {
        let actual_type = type_name(actual);
        if actual_type != expected_type {
            return Err(Mismatch::new(
                format!("$type: {expected_type}"),
                actual_type,
                format!("expected type {expected_type:?}, got {actual_type:?}"),
            ));
        }
    }

    Ok(())
}

/// Evaluates `$match` regex against a string value.
fn match_regex_operator(pattern: &Value, actual: &Value) -> MatchOutcome {
    let Value::String(pattern) = pattern else {
        return Err(Mismatch::new(
            "$match",
            describe(actual),
            "invalid $match value: expected a string pattern",
        ));
    };
    let Value::String(text) = actual else {
        return Err(Mismatch::new(
            format!("$match: {pattern}"),
            describe(actual),
            format!("expected string for $match, got {}", describe(actual)),
        ));
    };
    let Ok(compiled) = Regex::new(pattern) else {
        return Err(Mismatch::new(
            format!("$match: {pattern}"),
            text.to_string(),
            format!("invalid regex pattern {pattern:?}"),
        ));
    };
    if compiled.is_match(text) {
        Ok(())
    } else {
        Err(Mismatch::new(
            format!("$match: {pattern}"),
            text.to_string(),
            format!("expected string matching pattern {pattern:?}, got {text:?}"),
        ))
    }
}

/// Evaluates `$in` / `$or`: at least one alternative must match.
fn match_any_of(
    alternatives: &Value,
    actual: &Value,
    timing: &TimingConfig,
    operator: &str,
) -> MatchOutcome {
    let Value::Array(alternatives) = alternatives else {
        return Err(Mismatch::new(
            operator,
            describe(actual),
            format!("invalid {operator} value: expected an array of matchers"),
        ));
    };
    for alternative in alternatives {
        if match_value(alternative, actual, timing).is_ok() {
            return Ok(());
        }
    }
    Err(Mismatch::new(
        format!("{operator}: {}", Value::Array(alternatives.clone())),
        render_value(actual),
        format!("value {} did not match any {operator} alternative", render_value(actual)),
    ))
}

/// Evaluates `$size`: exact integer or `{"$gte": N}`.
fn match_size_operator(size: &Value, actual: &Value) -> MatchOutcome {
    let Value::Array(items) = actual else {
        return Err(Mismatch::new(
            "$size",
            describe(actual),
            format!("expected array for $size, got {}", describe(actual)),
        ));
    };

    if let Some(expected) = size.as_u64() {
        let expected = expected as usize;
        return if items.len() == expected {
            Ok(())
        } else {
            Err(Mismatch::new(
                format!("$size: {expected}"),
                items.len().to_string(),
                format!("expected array of size {expected}, got {}", items.len()),
            ))
        };
    }

    if let Value::Object(bounds) = size
        && let Some(gte) = bounds.get("$gte").and_then(Value::as_u64)
    {
        let gte = gte as usize;
        return if items.len() >= gte {
            Ok(())
        } else {
            Err(Mismatch::new(
                format!("$size: >= {gte}"),
                items.len().to_string(),
                format!("expected array of size >= {gte}, got {}", items.len()),
            ))
        };
    }

    Err(Mismatch::new(
        "$size",
        items.len().to_string(),
        format!("unsupported $size format: {size}"),
    ))
}

/// Evaluates `range: {min?, max?}` closed bounds against a number.
fn match_range_operator(range: &Value, actual: &Value) -> MatchOutcome {
    let Value::Object(bounds) = range else {
        return Err(Mismatch::new(
            "range",
            describe(actual),
            format!("invalid range value: {range}"),
        ));
    };
    let Some(number) = as_f64(actual) else {
        return Err(Mismatch::new(
            format!("range: {range}"),
            describe(actual),
            format!("expected number for range check, got {}", describe(actual)),
        ));
    };

    if let Some(min) = bounds.get("min").and_then(Value::as_f64)
        && number < min
    {
        return Err(Mismatch::new(
            format!(">= {min}"),
            render_value(actual),
            format!("expected number >= {min}, got {number}"),
        ));
    }
    if let Some(max) = bounds.get("max").and_then(Value::as_f64)
        && number > max
    {
        return Err(Mismatch::new(
            format!("<= {max}"),
            render_value(actual),
            format!("expected number <= {max}, got {number}"),
        ));
    }
    Ok(())
}

/// Field-wise object matching: every matcher key must be satisfied.
///
/// A field whose matcher is the string `absent` flips the polarity: the
/// field must not be present at all.
fn match_fields(expected: &Map<String, Value>, actual: &Value, timing: &TimingConfig) -> MatchOutcome {
    let Value::Object(fields) = actual else {
        return Err(Mismatch::new(
            "object",
            describe(actual),
            format!("expected object, got {}", describe(actual)),
        ));
    };

    for (key, matcher) in expected {
        if matcher.as_str() == Some("absent") {
            if let Some(present) = fields.get(key) {
                return Err(Mismatch::new(
                    "absent",
                    render_value(present),
                    format!(
                        "field {key:?}: expected absent, but field exists with value {}",
                        render_value(present)
                    ),
                ));
            }
            continue;
        }
        let Some(value) = fields.get(key) else {
            return Err(Mismatch::new(
                render_value(matcher),
                "missing",
                format!("field {key:?}: expected to exist but is missing"),
            ));
        };
        match_value(matcher, value, timing)
            .map_err(|mismatch| mismatch.contextualize(&format!("field {key:?}")))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Returns the JSON type name of a value.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders a value with its type for mismatch messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format!("{}: {}", type_name(other), render_value(other)),
    }
}

/// Extracts a numeric value as f64.
fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Requires the actual value to be a string.
fn require_string<'a>(token: &str, actual: &'a Value, expectation: &str) -> Result<&'a str, Mismatch> {
    actual.as_str().ok_or_else(|| {
        Mismatch::new(
            token,
            describe(actual),
            format!("expected {expectation}, got {}", describe(actual)),
        )
    })
}

/// Requires the actual value to be numeric.
fn require_number(token: &str, actual: &Value, expectation: &str) -> Result<f64, Mismatch> {
    as_f64(actual).ok_or_else(|| {
        Mismatch::new(
            token,
            describe(actual),
            format!("expected {expectation}, got {}", describe(actual)),
        )
    })
}

/// Requires the actual value to be an array.
fn require_array<'a>(
    token: &str,
    actual: &'a Value,
    expectation: &str,
) -> Result<&'a [Value], Mismatch> {
    match actual {
        Value::Array(items) => Ok(items),
        other => Err(Mismatch::new(
            token,
            describe(other),
            format!("expected {expectation}, got {}", describe(other)),
        )),
    }
}
