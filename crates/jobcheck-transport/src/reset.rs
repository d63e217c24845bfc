// crates/jobcheck-transport/src/reset.rs
// ============================================================================
// Module: HTTP Reset Hook
// Description: Pre-test state reset against an external endpoint.
// Purpose: Restore test isolation before each test begins.
// Dependencies: jobcheck-core, reqwest
// ============================================================================

//! ## Overview
//! When configured, the reset hook runs before every test and must complete
//! before the test's first step. This implementation issues a POST to a
//! reset endpoint exposed by the harness around the implementation under
//! test; a non-success response fails the hook, and the run aborts because
//! test isolation can no longer be guaranteed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use jobcheck_core::ResetError;
use jobcheck_core::ResetHook;
use reqwest::blocking::Client;

// ============================================================================
// SECTION: Hook Implementation
// ============================================================================

/// Reset hook that POSTs to an external reset endpoint.
pub struct HttpResetHook {
    /// Reset endpoint URL.
    url: String,
    /// HTTP client used for reset requests.
    client: Client,
}

impl HttpResetHook {
    /// Creates a reset hook for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ResetError`] when the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Result<Self, ResetError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| ResetError::Failed(format!("reset client build failed: {err}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl ResetHook for HttpResetHook {
    fn reset(&self) -> Result<(), ResetError> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .map_err(|err| ResetError::Failed(format!("reset request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(ResetError::Failed(format!(
                "reset endpoint returned status {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}
