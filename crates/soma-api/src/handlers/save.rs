//! Save endpoint: validates the caller and persists one check-in row.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use soma_core::NewCheckin;
use tracing::{debug, info, instrument};

use super::parse_body;
use crate::{crypto::validate_init_data, error::ApiError, AppState};

/// Insight text written with every check-in. The caller cannot override
/// it; any `insight` in the request is ignored.
const INSIGHT_PLACEHOLDER: &str = "Based on your check-in.";

/// Request body for the save endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveRequest {
    /// Signed session payload from the mini-app.
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    /// The check-in to store.
    pub checkin: Option<CheckinInput>,
}

/// Caller-supplied check-in fields.
///
/// Metric fields pass through to storage verbatim (absent fields become
/// JSON null). `alcohol` accepts any JSON value and is normalized to a
/// strict boolean at this boundary; `insight` is accepted but unused.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckinInput {
    /// Self-reported sleep quality.
    pub sleep: Value,
    /// Self-reported energy level.
    pub energy: Value,
    /// Self-reported stress level.
    pub stress: Value,
    /// Self-reported activity.
    pub activity: Value,
    /// Alcohol flag in whatever representation the client sent.
    pub alcohol: Value,
    /// Self-reported body sensation.
    pub soma: Value,
    /// Ignored; the server always writes its own insight text.
    pub insight: Value,
}

/// Stores a check-in for the verified caller.
///
/// # Errors
///
/// - 400 when `initData` or `checkin` is absent or the body is not JSON
/// - 401 with the validator's reason when the payload fails verification
/// - 500 when required configuration is missing or storage errors
#[instrument(name = "save_checkin", skip(state, body))]
pub async fn save_checkin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: SaveRequest = parse_body(&body)?;
    let (init_data, checkin) = match (request.init_data.filter(|s| !s.is_empty()), request.checkin)
    {
        (Some(init_data), Some(checkin)) => (init_data, checkin),
        _ => return Err(ApiError::BadRequest("Missing initData/checkin")),
    };

    let (credentials, storage) = state.collaborators()?;
    let user = validate_init_data(&init_data, credentials.bot_token)?;
    debug!(user_id = %user.id, "caller verified");

    let row = NewCheckin {
        telegram_user_id: user.id.to_string(),
        sleep: checkin.sleep,
        energy: checkin.energy,
        stress: checkin.stress,
        activity: checkin.activity,
        alcohol: json_truthy(&checkin.alcohol),
        soma: checkin.soma,
        insight: INSIGHT_PLACEHOLDER.to_string(),
    };

    storage.checkins.insert(&row).await?;
    info!(user_id = %user.id, "check-in stored");

    Ok((StatusCode::OK, "ok").into_response())
}

/// JavaScript-style truthiness for loosely-typed JSON fields.
///
/// `null`, `false`, numeric zero, and the empty string are false; every
/// other value, including arrays and objects, is true.
fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
