//! HTTP request handlers for the check-in endpoints.
//!
//! Handlers follow one pattern: parse the body from raw bytes, resolve
//! the request's collaborators (failing with the configuration
//! diagnostic), validate the caller's `initData`, perform exactly one
//! storage operation, and map the result. No storage call ever precedes
//! a successful validation.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod health;
pub mod latest;
pub mod save;

pub use health::{health_check, liveness_check};
pub use latest::fetch_latest;
pub use save::save_checkin;

/// Parses a JSON request body, mapping any failure to a 400.
///
/// Bodies are taken as raw bytes rather than through the `Json`
/// extractor so a malformed body is a plain 400 instead of an
/// extractor-specific status.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON body"))
}
