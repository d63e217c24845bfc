// crates/jobcheck-cli/src/loader.rs
// ============================================================================
// Module: Test Suite Loader
// Description: Recursive suite directory walk, parse, and validation.
// Purpose: Turn a directory of JSON files into validated, ordered test cases.
// Dependencies: jobcheck-core, serde_json
// ============================================================================

//! ## Overview
//! Every `*.json` file under the suites directory is one test case. Files
//! are read with a hard size limit, parsed strictly, and validated (step
//! identifiers must be unique within a test) before the engine starts; any
//! violation is a load error and the run refuses to begin. Tests are sorted
//! by test id for deterministic execution order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use jobcheck_core::SchemaError;
use jobcheck_core::TestCase;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a single test file in bytes.
pub const MAX_TEST_FILE_SIZE: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Suite loading errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant names the offending file where one exists.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Directory or file could not be read.
    #[error("reading {}: {reason}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
    /// Test file exceeds the size limit.
    #[error("test file too large: {} ({actual} bytes, limit {limit})", .path.display())]
    TooLarge {
        /// Offending file.
        path: PathBuf,
        /// Actual size in bytes.
        actual: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },
    /// Test file is not valid JSON for the test schema.
    #[error("parsing {}: {reason}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        reason: String,
    },
    /// Test file violates a schema invariant.
    #[error("{}: {source}", .path.display())]
    Schema {
        /// Offending file.
        path: PathBuf,
        /// Violated invariant.
        source: SchemaError,
    },
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Recursively loads all JSON test files from a directory.
///
/// Results are sorted by test id for deterministic ordering.
///
/// # Errors
///
/// Returns [`LoadError`] when any file cannot be read, parsed, or fails
/// schema validation.
pub fn load_tests(dir: &Path) -> Result<Vec<TestCase>, LoadError> {
    let mut tests = Vec::new();
    walk_directory(dir, &mut tests)?;
    tests.sort_by(|a, b| a.test_id.cmp(&b.test_id));
    Ok(tests)
}

/// Walks one directory level, recursing into subdirectories.
fn walk_directory(dir: &Path, tests: &mut Vec<TestCase>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|err| LoadError::Io {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|err| LoadError::Io {
            path: dir.to_path_buf(),
            reason: err.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_directory(&path, tests)?;
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        tests.push(load_test_file(&path)?);
    }
    Ok(())
}

/// Loads and validates a single test file.
fn load_test_file(path: &Path) -> Result<TestCase, LoadError> {
    let metadata = fs::metadata(path).map_err(|err| LoadError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if metadata.len() > MAX_TEST_FILE_SIZE {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            actual: metadata.len(),
            limit: MAX_TEST_FILE_SIZE,
        });
    }

    let raw = fs::read_to_string(path).map_err(|err| LoadError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut test: TestCase = serde_json::from_str(&raw).map_err(|err| LoadError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    test.file_path = path.display().to_string();
    test.validate().map_err(|source| LoadError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(test)
}

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Applies level, category, and single-test filters.
#[must_use]
pub fn filter_tests(
    tests: Vec<TestCase>,
    level: Option<u8>,
    category: Option<&str>,
    test_id: Option<&str>,
) -> Vec<TestCase> {
    tests
        .into_iter()
        .filter(|test| level.is_none_or(|wanted| test.level == wanted))
        .filter(|test| category.is_none_or(|wanted| test.category == wanted))
        .filter(|test| test_id.is_none_or(|wanted| test.test_id.as_str() == wanted))
        .collect()
}
