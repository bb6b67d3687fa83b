//! Error types for storage operations.
//!
//! Storage failures carry the collaborator's own message where one exists;
//! the HTTP layer surfaces that message verbatim in its 500 responses.

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised by the Supabase storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The outbound request failed before a response arrived
    /// (connect error, timeout, TLS failure).
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The storage API answered with a non-success status. `message` is
    /// the error text reported by the API itself.
    #[error("{message}")]
    Rejected {
        /// HTTP status returned by the storage API.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The storage API answered successfully but the body could not be
    /// decoded into the expected row shape.
    #[error("invalid storage response: {0}")]
    Decode(String),

    /// The configured storage endpoint is not a usable base URL.
    #[error("invalid storage endpoint URL: {0}")]
    Endpoint(String),
}
