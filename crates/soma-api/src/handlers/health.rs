//! Health probes for service monitoring.
//!
//! `/health` verifies the storage collaborator is reachable with the
//! current configuration; `/live` only proves the process is serving.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: HealthStatus,
    /// Timestamp when the health check was performed.
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks.
    pub checks: HealthChecks,
    /// Service version information.
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational.
    Healthy,
    /// Critical systems failing.
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Storage collaborator reachability.
    pub storage: ComponentHealth,
}

/// Health status for an individual component.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status.
    pub status: ComponentStatus,
    /// Optional error message if unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

/// Component-level health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy.
    Up,
    /// Component is experiencing issues.
    Down,
}

/// Primary health check endpoint.
///
/// Performs a lightweight reachability check against the storage
/// collaborator. An unconfigured service reports unhealthy with the
/// configuration diagnostic as the component message.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let start = Instant::now();

    let storage_health = match state.collaborators() {
        Ok((_, storage)) => match storage.health_check().await {
            Ok(()) => {
                debug!("storage health check passed");
                ComponentHealth {
                    status: ComponentStatus::Up,
                    message: None,
                    response_time_ms: elapsed_ms(start),
                }
            },
            Err(e) => {
                error!("storage health check failed: {e}");
                ComponentHealth {
                    status: ComponentStatus::Down,
                    message: Some(format!("storage unreachable: {e}")),
                    response_time_ms: elapsed_ms(start),
                }
            },
        },
        Err(e) => ComponentHealth {
            status: ComponentStatus::Down,
            message: Some(e.to_string()),
            response_time_ms: elapsed_ms(start),
        },
    };

    let (overall, status_code) = match storage_health.status {
        ComponentStatus::Up => (HealthStatus::Healthy, StatusCode::OK),
        ComponentStatus::Down => (HealthStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE),
    };

    let response = HealthResponse {
        status: overall,
        timestamp: Utc::now(),
        checks: HealthChecks { storage: storage_health },
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response)).into_response()
}

/// Liveness check endpoint.
///
/// A minimal check that does not touch external dependencies; it only
/// proves the HTTP server is responding.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> Response {
    let response = serde_json::json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "service": "soma-api"
    });

    (StatusCode::OK, Json(response)).into_response()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
