//! Fetch-latest endpoint: returns the caller's newest stored check-in.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use soma_core::CheckinSummary;
use tracing::{debug, instrument};

use super::parse_body;
use crate::{crypto::validate_init_data, error::ApiError, AppState};

/// Request body for the fetch-latest endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LatestRequest {
    /// Signed session payload from the mini-app.
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
}

/// Response payload: the newest record reduced to its summary fields,
/// or `null` when the caller has no check-ins yet.
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    /// Newest check-in summary, if any.
    pub latest: Option<CheckinSummary>,
}

/// Returns the verified caller's most recent check-in.
///
/// # Errors
///
/// - 400 when `initData` is absent or the body is not JSON
/// - 401 with the validator's reason when the payload fails verification
/// - 500 when required configuration is missing or storage errors
#[instrument(name = "fetch_latest", skip(state, body))]
pub async fn fetch_latest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: LatestRequest = parse_body(&body)?;
    let init_data = request
        .init_data
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::BadRequest("Missing initData"))?;

    let (credentials, storage) = state.collaborators()?;
    let user = validate_init_data(&init_data, credentials.bot_token)?;
    debug!(user_id = %user.id, "caller verified");

    let latest = storage.checkins.latest_for_user(&user.id.to_string()).await?;

    Ok(Json(LatestResponse { latest }).into_response())
}
