// crates/jobcheck-transport/src/lib.rs
// ============================================================================
// Module: Jobcheck Transport Library
// Description: Transport adapters and reset hooks for the engine.
// Purpose: Translate engine actions into wire requests, one adapter per protocol.
// Dependencies: jobcheck-core, reqwest
// ============================================================================

//! ## Overview
//! Each wire protocol gets one adapter implementing the engine's transport
//! contract. The HTTP adapter ships here; adapters for RPC-style protocols
//! build on the shared wire-status translation so their assertions stay in
//! the same HTTP-equivalent status space.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod reset;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::DEFAULT_MEDIA_TYPE;
pub use http::HttpAdapter;
pub use http::HttpAdapterConfig;
pub use reset::HttpResetHook;
pub use wire::HTTP_STATUS_CREATED;
pub use wire::HTTP_STATUS_OK;
pub use wire::WireStatus;
pub use wire::success_status;
