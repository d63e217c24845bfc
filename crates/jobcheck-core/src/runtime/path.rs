// crates/jobcheck-core/src/runtime/path.rs
// ============================================================================
// Module: Jobcheck Path Resolver
// Description: JSONPath-like navigation over parsed JSON documents.
// Purpose: Resolve assertion and template paths to values deterministically.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The resolver accepts dot traversal (`job.state`), literal indexing
//! (`items[0][1]`), wildcard projection (`jobs[*].type`), and first-match
//! filters (`jobs[?(@.state=='completed')].id`). Missing object fields are
//! soft (they resolve to null); type mismatches, out-of-range indices, and
//! malformed brackets are hard resolution failures. Segment splitting
//! respects bracket depth so filter expressions containing dots or quotes
//! survive intact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::runtime::render::render_value;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Hard path-resolution failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Soft outcomes (missing fields, unmatched filters) are not errors; they
///   resolve to null instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Field access was attempted on a non-object value.
    #[error("expected object at `{segment}`")]
    NotAnObject {
        /// Segment where the mismatch occurred.
        segment: String,
    },
    /// Index or filter access was attempted on a non-array value.
    #[error("expected array at `{segment}`")]
    NotAnArray {
        /// Segment where the mismatch occurred.
        segment: String,
    },
    /// Literal index fell outside the array bounds.
    #[error("array index {index} out of bounds (length {len}) at `{segment}`")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Array length.
        len: usize,
        /// Segment where the access occurred.
        segment: String,
    },
    /// Bracket expression was not a wildcard or a nonnegative integer.
    #[error("invalid array index in `{segment}`")]
    InvalidIndex {
        /// Segment with the malformed index.
        segment: String,
    },
    /// A bracket expression was never closed.
    #[error("unclosed bracket in `{segment}`")]
    UnclosedBracket {
        /// Segment with the unterminated bracket.
        segment: String,
    },
    /// A filter expression was malformed or used an unsupported operator.
    #[error("unsupported filter expression in `{segment}`")]
    UnsupportedFilter {
        /// Segment with the unsupported filter.
        segment: String,
    },
    /// Characters followed a bracket suffix without another bracket.
    #[error("unexpected characters after bracket in `{segment}`")]
    TrailingCharacters {
        /// Segment with the trailing characters.
        segment: String,
    },
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a path expression against a parsed JSON document.
///
/// A leading `$.` or `$` is stripped; the empty path denotes the root.
/// Wildcard projections return a flat array of the values that resolved;
/// elements that fail to resolve are silently dropped.
///
/// # Errors
///
/// Returns [`PathError`] for hard failures: wrong value types, out-of-range
/// indices, and malformed bracket or filter expressions.
pub fn resolve_path(path: &str, root: &Value) -> Result<Value, PathError> {
    let stripped = path.strip_prefix("$.").or_else(|| path.strip_prefix('$')).unwrap_or(path);
    resolve_segments(stripped, root)
}

/// Resolves an already-stripped path against a value.
fn resolve_segments(path: &str, root: &Value) -> Result<Value, PathError> {
    let parts = split_path(path);
    let mut current = root.clone();

    for (part_index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }

        let Some(bracket) = part.find('[') else {
            // Plain field access.
            let Value::Object(map) = &current else {
                return Err(PathError::NotAnObject {
                    segment: part.clone(),
                });
            };
            match map.get(part.as_str()) {
                Some(value) => current = value.clone(),
                None => return Ok(Value::Null),
            }
            continue;
        };

        // Field followed by one or more bracket suffixes.
        let field = &part[..bracket];
        let mut rest = &part[bracket..];

        if !field.is_empty() {
            let Value::Object(map) = &current else {
                return Err(PathError::NotAnObject {
                    segment: field.to_string(),
                });
            };
            current = map.get(field).cloned().unwrap_or(Value::Null);
        }

        if rest.starts_with("[?(@.") {
            current = apply_filter(&mut rest, &current, part)?;
            if !rest.is_empty()
                && !current.is_null()
                && let Some(remaining) = rest.strip_prefix('.')
            {
                return resolve_segments(remaining, &current);
            }
            continue;
        }

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(PathError::TrailingCharacters {
                    segment: part.clone(),
                });
            }
            let Some(close) = rest.find(']') else {
                return Err(PathError::UnclosedBracket {
                    segment: part.clone(),
                });
            };
            let index_expr = &rest[1..close];
            rest = &rest[close + 1..];

            if index_expr == "*" {
                return project_wildcard(&current, rest, &parts[part_index + 1..], part);
            }

            let index: usize = index_expr.parse().map_err(|_| PathError::InvalidIndex {
                segment: part.clone(),
            })?;
            let Value::Array(items) = &current else {
                return Err(PathError::NotAnArray {
                    segment: part.clone(),
                });
            };
            if index >= items.len() {
                return Err(PathError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                    segment: part.clone(),
                });
            }
            current = items[index].clone();
        }
    }

    Ok(current)
}

/// Applies a `[?(@.key=='value')]` filter, returning the first match.
///
/// The expression is consumed from `rest`. No matching element yields null,
/// which then propagates through any remaining path.
fn apply_filter(rest: &mut &str, current: &Value, segment: &str) -> Result<Value, PathError> {
    let Some(close) = rest.find(")]") else {
        return Err(PathError::UnclosedBracket {
            segment: segment.to_string(),
        });
    };
    // Strip the `[?(@.` prefix and the `)]` suffix.
    let expr = &rest[5..close];
    *rest = &rest[close + 2..];

    let Some(eq) = expr.find("==") else {
        return Err(PathError::UnsupportedFilter {
            segment: segment.to_string(),
        });
    };
    let key = &expr[..eq];
    let wanted = expr[eq + 2..].trim_matches(|ch| ch == '\'' || ch == '"');

    let Value::Array(items) = current else {
        return Err(PathError::NotAnArray {
            segment: segment.to_string(),
        });
    };

    for item in items {
        let Value::Object(map) = item else {
            continue;
        };
        let Some(value) = map.get(key) else {
            continue;
        };
        if render_value(value) == wanted {
            return Ok(item.clone());
        }
    }
    Ok(Value::Null)
}

/// Projects the remaining path over every element of an array.
///
/// The remainder is the leftover bracket text on this segment plus all later
/// dot-segments. Elements whose resolution fails or yields null are dropped.
fn project_wildcard(
    current: &Value,
    rest: &str,
    later_parts: &[String],
    segment: &str,
) -> Result<Value, PathError> {
    let Value::Array(items) = current else {
        return Err(PathError::NotAnArray {
            segment: segment.to_string(),
        });
    };

    let mut segments: Vec<&str> = Vec::new();
    if !rest.is_empty() {
        segments.push(rest);
    }
    for later in later_parts {
        segments.push(later.as_str());
    }
    let remaining = segments.join(".");

    let mut projected = Vec::new();
    for item in items {
        if remaining.is_empty() {
            projected.push(item.clone());
        } else if let Ok(value) = resolve_segments(&remaining, item)
            && !value.is_null()
        {
            projected.push(value);
        }
    }
    Ok(Value::Array(projected))
}

// ============================================================================
// SECTION: Segment Splitting
// ============================================================================

/// Splits a dot-separated path while respecting bracket depth.
fn split_path(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0_u32;

    for ch in path.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '.' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts
}
