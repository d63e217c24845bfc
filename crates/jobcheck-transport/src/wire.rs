// crates/jobcheck-transport/src/wire.rs
// ============================================================================
// Module: Wire Status Translation
// Description: Canonical status mapping for non-HTTP transport adapters.
// Purpose: Keep every adapter's status space aligned with assertions.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Assertions compare against HTTP-equivalent status integers. Adapters for
//! RPC-style protocols translate their native status codes through this
//! table so the same declarative test files work against every wire
//! protocol. Operations whose natural success is resource creation override
//! their success status to 201.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status override for operations that create a resource.
pub const HTTP_STATUS_CREATED: u16 = 201;

/// Default success status for all other operations.
pub const HTTP_STATUS_OK: u16 = 200;

/// Operations whose success maps to 201 Created.
const CREATED_OPERATIONS: &[&str] = &["enqueue", "enqueue_batch", "register_cron", "create_workflow"];

// ============================================================================
// SECTION: Wire Status
// ============================================================================

/// RPC-style status space translated into HTTP-equivalent integers.
///
/// # Invariants
/// - Variants are stable for synthetic error bodies and adapter mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStatus {
    /// Success.
    Ok,
    /// Malformed or rejected request input.
    InvalidArgument,
    /// Missing or invalid credentials.
    Unauthenticated,
    /// Authenticated but not permitted.
    PermissionDenied,
    /// Resource does not exist.
    NotFound,
    /// Resource already exists.
    AlreadyExists,
    /// Precondition for the operation was not met.
    FailedPrecondition,
    /// Rate or quota exhausted.
    ResourceExhausted,
    /// Internal server failure.
    Internal,
    /// Operation not implemented by the target.
    Unimplemented,
    /// Target unreachable or refusing connections.
    Unavailable,
    /// Request deadline exceeded.
    DeadlineExceeded,
}

impl WireStatus {
    /// Returns the closest HTTP status equivalent.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::FailedPrecondition => 412,
            Self::ResourceExhausted => 429,
            Self::Internal => 500,
            Self::Unimplemented => 501,
            Self::Unavailable => 503,
            Self::DeadlineExceeded => 504,
        }
    }

    /// Returns a stable token for synthetic error bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::FailedPrecondition => "failed_precondition",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Internal => "internal",
            Self::Unimplemented => "unimplemented",
            Self::Unavailable => "unavailable",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

// ============================================================================
// SECTION: Success Overrides
// ============================================================================

/// Returns the success status for a named operation.
///
/// Operations that create resources report 201; everything else 200.
#[must_use]
pub fn success_status(operation: &str) -> u16 {
    if CREATED_OPERATIONS.contains(&operation) {
        HTTP_STATUS_CREATED
    } else {
        HTTP_STATUS_OK
    }
}
