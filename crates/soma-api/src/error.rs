//! HTTP error mapping for the check-in endpoints.
//!
//! Every failure a handler can hit is a variant here, and this is the
//! single place that turns typed failures into status codes and plain
//! text bodies. Handlers never construct HTTP error responses directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use soma_core::StoreError;
use thiserror::Error;
use tracing::{error, warn};

use crate::crypto::InitDataError;

/// Failure modes of the check-in endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, unparseable, or lacking required fields.
    /// Maps to 400.
    #[error("{0}")]
    BadRequest(&'static str),

    /// Required server configuration absent. Maps to 500 with a
    /// diagnostic naming every missing variable.
    #[error("Server env not configured (missing {})", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    /// `initData` validation failed. Maps to 401 with the validator's
    /// reason string.
    #[error(transparent)]
    Unauthorized(#[from] InitDataError),

    /// The storage collaborator reported an error. Maps to 500 with the
    /// collaborator's message.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Anything unexpected. Maps to 500 with the fullest diagnostic
    /// available.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotConfigured(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };

        // The full anyhow chain for unexpected failures, Display for the
        // rest: the body is the diagnostic.
        let body = match &self {
            Self::Internal(err) => format!("{err:#}"),
            other => other.to_string(),
        };

        match &self {
            Self::BadRequest(_) | Self::Unauthorized(_) => {
                warn!(status = status.as_u16(), reason = %body, "request rejected");
            },
            _ => {
                error!(status = status.as_u16(), reason = %body, "request failed");
            },
        }

        (status, body).into_response()
    }
}
