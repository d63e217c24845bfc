// crates/jobcheck-config/src/lib.rs
// ============================================================================
// Module: Jobcheck Config Library
// Description: Canonical runner configuration model and validation.
// Purpose: Single source of truth for jobcheck.toml semantics.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! `jobcheck-config` defines the runner configuration model shared by the
//! CLI and any embedding. It provides strict, fail-closed validation so a
//! misconfigured run is rejected before the first request is sent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
