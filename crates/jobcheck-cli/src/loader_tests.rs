// crates/jobcheck-cli/src/loader_tests.rs
// ============================================================================
// Module: Suite Loader Tests
// Description: Tests for directory walking, parsing, and filtering.
// Purpose: Ensure malformed suites fail closed and ordering is stable.
// Dependencies: jobcheck-cli loader, tempfile
// ============================================================================

//! ## Overview
//! Validates the loader against real temp directories: recursive walking,
//! deterministic test ordering, file-path population, duplicate-step-id
//! rejection, parse failures, and the level/category/test-id filters.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::loader::LoadError;
use crate::loader::filter_tests;
use crate::loader::load_tests;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Writes a minimal valid test file.
fn write_test(dir: &Path, file: &str, test_id: &str, level: u8, category: &str) {
    let body = format!(
        r#"{{
            "test_id": "{test_id}",
            "level": {level},
            "category": "{category}",
            "name": "sample",
            "steps": [{{"id": "s1", "action": "GET", "path": "/health"}}]
        }}"#
    );
    fs::write(dir.join(file), body).expect("write test file");
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Tests load recursively and sort by test id.
#[test]
fn loads_recursively_in_sorted_order() {
    let dir = TempDir::new().expect("create temp dir");
    let nested = dir.path().join("level1");
    fs::create_dir(&nested).expect("create nested dir");

    write_test(dir.path(), "b.json", "L1-RET-001", 1, "retry");
    write_test(&nested, "a.json", "L0-ENV-001", 0, "envelope");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write stray file");

    let tests = load_tests(dir.path()).expect("load must succeed");

    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0].test_id.as_str(), "L0-ENV-001");
    assert_eq!(tests[1].test_id.as_str(), "L1-RET-001");
    assert!(tests[0].file_path.ends_with("a.json"));
}

/// Malformed JSON refuses the whole run.
#[test]
fn malformed_json_fails_load() {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join("bad.json"), "{not json").expect("write bad file");

    let error = load_tests(dir.path()).expect_err("parse error expected");
    assert!(matches!(error, LoadError::Parse { .. }));
}

/// Duplicate step identifiers are a load error.
#[test]
fn duplicate_step_ids_fail_load() {
    let dir = TempDir::new().expect("create temp dir");
    let body = r#"{
        "test_id": "L0-DUP-001",
        "level": 0,
        "category": "envelope",
        "name": "duplicate ids",
        "steps": [
            {"id": "s1", "action": "GET", "path": "/a"},
            {"id": "s1", "action": "GET", "path": "/b"}
        ]
    }"#;
    fs::write(dir.path().join("dup.json"), body).expect("write test file");

    let error = load_tests(dir.path()).expect_err("schema error expected");
    assert!(matches!(error, LoadError::Schema { .. }));
}

/// A missing suites directory is an IO error.
#[test]
fn missing_directory_fails() {
    let dir = TempDir::new().expect("create temp dir");
    let error = load_tests(&dir.path().join("absent")).expect_err("io error expected");
    assert!(matches!(error, LoadError::Io { .. }));
}

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Level, category, and test-id filters compose.
#[test]
fn filters_apply_exactly() {
    let dir = TempDir::new().expect("create temp dir");
    write_test(dir.path(), "a.json", "L0-ENV-001", 0, "envelope");
    write_test(dir.path(), "b.json", "L1-RET-001", 1, "retry");
    write_test(dir.path(), "c.json", "L1-RET-002", 1, "retry");
    let tests = load_tests(dir.path()).expect("load must succeed");

    let by_level = filter_tests(tests.clone(), Some(1), None, None);
    assert_eq!(by_level.len(), 2);

    let by_category = filter_tests(tests.clone(), None, Some("envelope"), None);
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].test_id.as_str(), "L0-ENV-001");

    let by_id = filter_tests(tests.clone(), None, None, Some("L1-RET-002"));
    assert_eq!(by_id.len(), 1);

    let none = filter_tests(tests, Some(0), Some("retry"), None);
    assert!(none.is_empty());
}
