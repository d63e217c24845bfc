// crates/jobcheck-core/src/runtime/render.rs
// ============================================================================
// Module: Jobcheck Value Rendering
// Description: Canonical string rendering for JSON values.
// Purpose: One rendering rule shared by filters, matchers, and templates.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Several engine features compare or substitute JSON values as text: filter
//! expressions, `contains:`/`not_contains:` element checks, and template
//! substitution. They all use the same rule: strings as-is, numbers in
//! shortest decimal form (integer-valued numbers without a decimal point),
//! everything else as compact JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a JSON value to its canonical string form.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(uint) = number.as_u64() {
                uint.to_string()
            } else {
                number.as_f64().map_or_else(|| number.to_string(), |float| format!("{float}"))
            }
        }
        other => other.to_string(),
    }
}
