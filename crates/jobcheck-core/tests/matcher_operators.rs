// crates/jobcheck-core/tests/matcher_operators.rs
// ============================================================================
// Module: Matcher Operator Tests
// Description: Tests for typed matchers, operator objects, and field-wise objects.
// Purpose: Ensure dispatch order and operator semantics hold recursively.
// Dependencies: jobcheck-core, serde_json
// ============================================================================

//! ## Overview
//! Covers the non-string matcher shapes: numeric equality (integer-exact and
//! epsilon), booleans, element-wise arrays, the operator objects (`$exists`,
//! `$match`, `$in`, `$size`, `$or`, `$empty`, `range`), and the field-wise
//! object fallback including the `absent` polarity flip.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use jobcheck_core::TimingConfig;
use jobcheck_core::match_value;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Matches a matcher value against an actual value with default timing.
fn matches(matcher: &Value, actual: &Value) -> bool {
    match_value(matcher, actual, &TimingConfig::default()).is_ok()
}

// ============================================================================
// SECTION: Numbers and Booleans
// ============================================================================

/// Integral numbers compare exactly regardless of representation.
#[test]
fn integer_numbers_compare_exactly() {
    assert!(matches(&json!(42), &json!(42)));
    assert!(matches(&json!(42), &json!(42.0)));
    assert!(!matches(&json!(42), &json!(43)));
    assert!(!matches(&json!(42), &json!("42")));
}

/// Fractional numbers compare within 1e-9.
#[test]
fn float_numbers_compare_within_epsilon() {
    assert!(matches(&json!(1.5), &json!(1.5)));
    assert!(matches(&json!(1.5), &json!(1.500_000_000_4)));
    assert!(!matches(&json!(1.5), &json!(1.501)));
}

/// Boolean matchers require an actual boolean of equal value.
#[test]
fn boolean_matchers() {
    assert!(matches(&json!(true), &json!(true)));
    assert!(!matches(&json!(true), &json!(false)));
    assert!(!matches(&json!(false), &json!(0)));
    assert!(!matches(&json!(true), &json!("true")));
}

// ============================================================================
// SECTION: Arrays
// ============================================================================

/// Array matchers require identical length and match element-wise.
#[test]
fn arrays_match_element_wise() {
    assert!(matches(&json!([1, "two", true]), &json!([1, "two", true])));
    assert!(!matches(&json!([1, 2]), &json!([1, 2, 3])));
    assert!(!matches(&json!([1, 2]), &json!([1, 3])));
    assert!(!matches(&json!([1]), &json!("not-an-array")));
}

/// Array elements may themselves be typed predicates.
#[test]
fn array_elements_recurse() {
    let matcher = json!(["string:uuid", "number:positive"]);
    let actual = json!(["550e8400-e29b-41d4-a716-446655440000", 3]);
    assert!(matches(&matcher, &actual));
    assert!(!matches(&matcher, &json!(["nope", 3])));
}

// ============================================================================
// SECTION: Operator Objects
// ============================================================================

/// `$exists: true` with `$type` constrains both presence and type.
#[test]
fn exists_operator_with_type() {
    let matcher = json!({"$exists": true, "$type": "string"});
    assert!(matches(&matcher, &json!("hello")));
    assert!(!matches(&matcher, &json!(42)));
    assert!(!matches(&matcher, &Value::Null));
}

/// `$exists: false` demands absence.
#[test]
fn exists_operator_negative() {
    let matcher = json!({"$exists": false});
    assert!(matches(&matcher, &Value::Null));
    assert!(!matches(&matcher, &json!(0)));
}

/// `$match` applies a regex to string values.
#[test]
fn match_operator() {
    let matcher = json!({"$match": "^job-[0-9]+$"});
    assert!(matches(&matcher, &json!("job-7")));
    assert!(!matches(&matcher, &json!("task-7")));
    assert!(!matches(&matcher, &json!(7)));
}

/// `$in` alternatives are tested recursively, so typed predicates work.
#[test]
fn in_operator_recurses() {
    let matcher = json!({"$in": [200, 201]});
    assert!(matches(&matcher, &json!(200)));
    assert!(matches(&matcher, &json!(201)));
    assert!(!matches(&matcher, &json!(404)));

    let typed = json!({"$in": ["string:uuid", "pending"]});
    assert!(matches(&typed, &json!("pending")));
    assert!(matches(&typed, &json!("550e8400-e29b-41d4-a716-446655440000")));
    assert!(!matches(&typed, &json!("neither")));
}

/// `$size` accepts an exact integer or a `$gte` bound.
#[test]
fn size_operator_forms() {
    assert!(matches(&json!({"$size": 2}), &json!([1, 2])));
    assert!(!matches(&json!({"$size": 2}), &json!([1])));
    assert!(matches(&json!({"$size": {"$gte": 2}}), &json!([1, 2, 3])));
    assert!(!matches(&json!({"$size": {"$gte": 2}}), &json!([1])));
    assert!(!matches(&json!({"$size": 2}), &json!("not-an-array")));
}

/// `$or` passes when any alternative matches.
#[test]
fn or_operator() {
    let matcher = json!({"$or": ["active", "completed"]});
    assert!(matches(&matcher, &json!("active")));
    assert!(matches(&matcher, &json!("completed")));
    assert!(!matches(&matcher, &json!("dead")));
}

/// `range` applies closed numeric bounds; either side is optional.
#[test]
fn range_operator() {
    assert!(matches(&json!({"range": {"min": 5}}), &json!(5)));
    assert!(!matches(&json!({"range": {"min": 5}}), &json!(3)));
    assert!(matches(&json!({"range": {"max": 10}}), &json!(10)));
    assert!(!matches(&json!({"range": {"max": 10}}), &json!(11)));
    assert!(matches(&json!({"range": {"min": 2, "max": 3}}), &json!(2.5)));
    assert!(!matches(&json!({"range": {"min": 2}}), &json!("2")));
}

// ============================================================================
// SECTION: Field-Wise Objects
// ============================================================================

/// Objects without operators match field-wise and recursively.
#[test]
fn field_wise_objects_recurse() {
    let matcher = json!({"job": {"id": "string:uuid", "attempt": "number:positive"}});
    let actual = json!({
        "job": {"id": "550e8400-e29b-41d4-a716-446655440000", "attempt": 2, "extra": true}
    });
    assert!(matches(&matcher, &actual), "extra actual fields are allowed");
    assert!(!matches(&matcher, &json!({"job": {"id": "bad", "attempt": 2}})));
}

/// Missing fields fail unless the field matcher is `absent`.
#[test]
fn field_wise_missing_and_absent() {
    let requires = json!({"state": "any"});
    assert!(!matches(&requires, &json!({})));

    let forbids = json!({"error": "absent"});
    assert!(matches(&forbids, &json!({})));
    assert!(!matches(&forbids, &json!({"error": "boom"})));
    // A present-but-null field still counts as present.
    assert!(!matches(&forbids, &json!({"error": null})));
}

/// Field-wise matching requires an actual object.
#[test]
fn field_wise_requires_object() {
    assert!(!matches(&json!({"a": 1}), &json!([1])));
    assert!(!matches(&json!({"a": 1}), &json!("a")));
}
