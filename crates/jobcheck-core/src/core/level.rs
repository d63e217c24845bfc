// crates/jobcheck-core/src/core/level.rs
// ============================================================================
// Module: Jobcheck Conformance Levels
// Description: Tier names and bounds for the level hierarchy.
// Purpose: Keep the 0-4 level vocabulary in one place.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Conformance levels form a superset hierarchy: a target conformant at
//! level N satisfies every level below it. Levels outside 0-4 are invalid
//! and render as `Unknown`.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lowest conformance level.
pub const MIN_LEVEL: u8 = 0;
/// Highest conformance level.
pub const MAX_LEVEL: u8 = 4;

// ============================================================================
// SECTION: Level Names
// ============================================================================

/// Returns the human-readable name for a conformance level.
#[must_use]
pub const fn level_name(level: u8) -> &'static str {
    match level {
        0 => "Core",
        1 => "Reliable",
        2 => "Scheduled",
        3 => "Orchestration",
        4 => "Advanced",
        _ => "Unknown",
    }
}

/// Returns true when the level lies within the defined hierarchy.
#[must_use]
pub const fn is_valid_level(level: u8) -> bool {
    level <= MAX_LEVEL
}
