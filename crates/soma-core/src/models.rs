//! Domain models and strongly-typed identifiers.
//!
//! Check-in metric fields arrive as loosely-typed JSON from the mini-app
//! and are stored verbatim; everything the service itself depends on
//! (identity, the alcohol flag, timestamps) gets an explicit type here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Strongly-typed Telegram user identifier.
///
/// Telegram issues positive integer ids. Zero never identifies a real
/// user and is treated as an absent identity claim by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identity claim embedded in a signed `initData` payload.
///
/// Only `id` is required; the remaining fields mirror what Telegram puts
/// in the `user` value and are kept for logging and future use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    /// The caller's Telegram user id.
    pub id: UserId,
    /// First name as set in the Telegram profile.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name, if present.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Public username, if present.
    #[serde(default)]
    pub username: Option<String>,
    /// IETF language tag of the client.
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Row payload inserted into the `checkins` collection.
///
/// Metric fields (`sleep`, `energy`, `stress`, `activity`, `soma`) are
/// caller-supplied JSON stored verbatim. `alcohol` is normalized to a
/// strict boolean before this struct is built, and `insight` is always
/// filled server-side. `created_at` is assigned by the store on insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewCheckin {
    /// Owner identity, the verified Telegram user id as a string.
    pub telegram_user_id: String,
    /// Self-reported sleep quality.
    pub sleep: Value,
    /// Self-reported energy level.
    pub energy: Value,
    /// Self-reported stress level.
    pub stress: Value,
    /// Self-reported activity.
    pub activity: Value,
    /// Whether the caller reported drinking alcohol.
    pub alcohol: bool,
    /// Self-reported body sensation.
    pub soma: Value,
    /// Server-generated insight text.
    pub insight: String,
}

/// Field subset of a stored check-in returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinSummary {
    /// When the check-in was stored.
    pub created_at: DateTime<Utc>,
    /// Self-reported body sensation, as stored.
    pub soma: Value,
    /// Insight text, as stored.
    pub insight: String,
}
