// crates/jobcheck-transport/src/http.rs
// ============================================================================
// Module: HTTP Transport Adapter
// Description: Blocking HTTP adapter for the conformance engine.
// Purpose: Execute resolved steps against an HTTP target with strict limits.
// Dependencies: jobcheck-core, reqwest
// ============================================================================

//! ## Overview
//! The HTTP adapter maps engine actions directly onto HTTP methods against
//! `base_url + path`. A request body defaults to the job-queue media type
//! unless the step supplies its own content type. Transport failures are
//! mapped into the wire-status vocabulary and surfaced as errors the engine
//! records as synthetic step results; the adapter itself never panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

use jobcheck_core::ResponseHeaders;
use jobcheck_core::TransportAction;
use jobcheck_core::TransportAdapter;
use jobcheck_core::TransportError;
use jobcheck_core::TransportResponse;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;

use crate::wire::WireStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type applied to request bodies when no content type is given.
pub const DEFAULT_MEDIA_TYPE: &str = "application/openjobspec+json";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP adapter.
///
/// # Invariants
/// - `base_url` is normalized (no trailing slash) before use.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAdapterConfig {
    /// Base URL of the implementation under test.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpAdapterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 30_000,
            user_agent: "jobcheck/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Blocking HTTP transport adapter.
///
/// The client is built once and reused serially across tests.
pub struct HttpAdapter {
    /// Normalized base URL.
    base_url: String,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpAdapter {
    /// Creates an HTTP adapter from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be built.
    pub fn new(config: HttpAdapterConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError {
                code: WireStatus::Internal.as_str().to_string(),
                message: format!("http client build failed: {err}"),
                status: WireStatus::Internal.http_status(),
                duration_ms: 0,
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Classifies a request failure into the wire-status vocabulary.
    fn classify_error(error: &reqwest::Error) -> WireStatus {
        if error.is_timeout() {
            WireStatus::DeadlineExceeded
        } else if error.is_connect() {
            WireStatus::Unavailable
        } else {
            WireStatus::Internal
        }
    }
}

impl TransportAdapter for HttpAdapter {
    fn execute(
        &self,
        action: TransportAction,
        path: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = match action {
            TransportAction::Get => self.client.get(&url),
            TransportAction::Post => self.client.post(&url),
            TransportAction::Delete => self.client.delete(&url),
        };

        request = apply_headers(request, headers, body.is_some());
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let start = Instant::now();
        let response = request.send().map_err(|err| {
            let status = Self::classify_error(&err);
            TransportError {
                code: status.as_str().to_string(),
                message: format!("http request failed: {err}"),
                status: status.http_status(),
                duration_ms: millis_since(start),
            }
        })?;

        let status = response.status().as_u16();
        let mut captured = ResponseHeaders::new();
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                captured.insert(name.as_str(), text);
            }
        }

        let bytes = response.bytes().map_err(|err| TransportError {
            code: WireStatus::Internal.as_str().to_string(),
            message: format!("failed to read response body: {err}"),
            status: WireStatus::Internal.http_status(),
            duration_ms: millis_since(start),
        })?;

        Ok(TransportResponse {
            status,
            headers: captured,
            body: bytes.to_vec(),
            duration_ms: millis_since(start),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies step headers, defaulting the content type for bodies.
fn apply_headers(
    mut request: RequestBuilder,
    headers: &BTreeMap<String, String>,
    has_body: bool,
) -> RequestBuilder {
    let mut has_content_type = false;
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        request = request.header(name.as_str(), value.as_str());
    }
    if has_body && !has_content_type {
        request = request.header("Content-Type", DEFAULT_MEDIA_TYPE);
    }
    request
}

/// Elapsed wall time since `start`, in whole milliseconds.
fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
