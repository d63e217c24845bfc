// crates/jobcheck-core/src/runtime/mod.rs
// ============================================================================
// Module: Jobcheck Runtime
// Description: Matcher, path, template, executor, and report modules.
// Purpose: Execute declarative tests and aggregate their outcomes.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement test execution end to end: matcher and path
//! evaluation at the leaves, template resolution between steps, the step
//! executor orchestrating a test, and the report aggregator folding results
//! into the suite report.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod executor;
pub mod matcher;
pub mod path;
pub mod render;
pub mod report;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use executor::EngineConfig;
pub use executor::Executor;
pub use executor::StepContext;
pub use executor::evaluate_status;
pub use matcher::MatchOutcome;
pub use matcher::Mismatch;
pub use matcher::match_value;
pub use path::PathError;
pub use path::resolve_path;
pub use render::render_value;
pub use report::TEST_SUITE_VERSION;
pub use report::build_report;
pub use template::resolve_matcher_templates;
pub use template::resolve_templates;
pub use template::resolve_value_templates;
