//! Error types for the Copiloto domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Two of the variants carry a propagation policy (spelled out where they
//! are produced): `NotFound` and `Validation` are reported to the caller
//! before any state is mutated, while model failures are recovered inside
//! the orchestrator and never surface as a transport fault.

use thiserror::Error;

/// The top-level error type for all Copiloto operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A thread or client does not exist, or belongs to another promoter.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or empty required input; rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    // --- Model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the hosted model endpoint.
///
/// The orchestrator collapses every variant into one degraded outcome for
/// the end user; the subtypes exist so logs can tell an expired key from a
/// network blip.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by model endpoint")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response payload: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
