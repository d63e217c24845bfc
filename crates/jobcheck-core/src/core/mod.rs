// crates/jobcheck-core/src/core/mod.rs
// ============================================================================
// Module: Jobcheck Core Types
// Description: Schema, identifier, timing, and level definitions.
// Purpose: Provide the data model shared by the runtime and interfaces.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types cover the declarative test format and the result structures
//! the engine emits. They carry no execution logic; the runtime modules
//! operate on them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod level;
pub mod schema;
pub mod timing;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::StepId;
pub use identifiers::TestId;
pub use level::MAX_LEVEL;
pub use level::MIN_LEVEL;
pub use level::is_valid_level;
pub use level::level_name;
pub use schema::Assertions;
pub use schema::Failure;
pub use schema::LevelSummary;
pub use schema::ResponseHeaders;
pub use schema::ResultsSummary;
pub use schema::SchemaError;
pub use schema::Step;
pub use schema::StepAction;
pub use schema::StepBlock;
pub use schema::StepResult;
pub use schema::SuiteReport;
pub use schema::TestCase;
pub use schema::TestResult;
pub use schema::TimingAssertion;
pub use schema::Verdict;
pub use timing::TimingConfig;
pub use timing::check_timing;
