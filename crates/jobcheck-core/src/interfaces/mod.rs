// crates/jobcheck-core/src/interfaces/mod.rs
// ============================================================================
// Module: Jobcheck Interfaces
// Description: Protocol-agnostic contracts for transports and reset hooks.
// Purpose: Define the surfaces the engine uses without embedding a protocol.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The engine drives an implementation under test exclusively through these
//! interfaces. One transport adapter exists per wire protocol; each adapter
//! maps its native status space onto HTTP-equivalent integers so the same
//! declarative assertions work against every protocol. Adapters must be safe
//! for serial reuse across tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::ResponseHeaders;

// ============================================================================
// SECTION: Transport Adapter
// ============================================================================

/// Request action dispatched to a transport adapter.
///
/// WAIT and ASSERT steps never reach the transport, so only the
/// request-bearing actions appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    /// Read a resource.
    Get,
    /// Create or mutate a resource.
    Post,
    /// Delete a resource.
    Delete,
}

impl TransportAction {
    /// Returns the canonical token for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Response produced by a transport adapter.
///
/// # Invariants
/// - `status` lives in the HTTP-equivalent integer space regardless of the
///   underlying protocol.
/// - `headers` preserve first-insertion order for lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Canonical status integer.
    pub status: u16,
    /// Response headers.
    pub headers: ResponseHeaders,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Wall-clock request duration in milliseconds.
    pub duration_ms: u64,
}

/// Transport failure surfaced by an adapter.
///
/// # Invariants
/// - `status` is the HTTP-equivalent integer the failure maps to.
/// - Variant data is stable for synthetic error bodies.
#[derive(Debug, Error)]
#[error("transport error {code}: {message}")]
pub struct TransportError {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Mapped status integer for assertion purposes.
    pub status: u16,
    /// Wall time spent before the failure, in milliseconds.
    pub duration_ms: u64,
}

impl TransportError {
    /// Renders the synthetic error body the engine records for this failure.
    ///
    /// The engine does not distinguish transport errors from protocol
    /// errors; assertions run against this body like any other response.
    #[must_use]
    pub fn synthetic_body(&self) -> Value {
        json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        })
    }
}

/// Protocol-specific adapter that executes one resolved step request.
pub trait TransportAdapter {
    /// Executes a request and returns the canonicalized response.
    ///
    /// The path and body arrive fully template-resolved. Implementations
    /// must return before the engine starts the next step and must honor
    /// their configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request cannot be completed; the
    /// engine converts the error into a synthetic step result rather than
    /// aborting the test.
    fn execute(
        &self,
        action: TransportAction,
        path: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&str>,
    ) -> Result<TransportResponse, TransportError>;
}

// ============================================================================
// SECTION: Reset Hook
// ============================================================================

/// Reset hook errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ResetError {
    /// The external state store could not be reset.
    #[error("reset hook failed: {0}")]
    Failed(String),
}

/// Optional hook that clears external state before each test.
///
/// When configured, the hook is invoked before a test's first step and must
/// complete before that step begins.
pub trait ResetHook {
    /// Resets the external state store.
    ///
    /// # Errors
    ///
    /// Returns [`ResetError`] when the reset did not complete; the run
    /// aborts since test isolation can no longer be guaranteed.
    fn reset(&self) -> Result<(), ResetError>;
}
