//! Telegram Web App `initData` validation.
//!
//! Mini-app sessions arrive as a URL-encoded payload whose `hash` field
//! carries an HMAC-SHA256 signature over the remaining fields. The
//! derivation is fixed by the external signer: the bot token is first
//! keyed by the literal `"WebAppData"`, and the resulting digest keys the
//! signature over the canonical check string. Both stages must use
//! SHA-256 in exactly this order to interoperate with payloads Telegram
//! produces.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use soma_core::TelegramUser;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Reserved payload key carrying the signature.
const HASH_KEY: &str = "hash";

/// Reserved payload key carrying the JSON-encoded identity claim.
const USER_KEY: &str = "user";

/// Fixed key for the secret-key derivation stage.
const KEY_DERIVATION_TAG: &[u8] = b"WebAppData";

/// Failures produced by `initData` validation.
///
/// The `Display` strings double as the 401 response body, so callers can
/// tell exactly which stage rejected their payload.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InitDataError {
    /// The payload carries no `hash` field.
    #[error("Missing hash")]
    MissingSignature,

    /// The recomputed signature does not match the supplied one.
    #[error("Invalid hash")]
    InvalidSignature,

    /// The signature checks out but the payload carries no usable
    /// identity claim.
    #[error("Missing user")]
    MissingIdentity,
}

/// Validates a signed `initData` payload and extracts the identity claim.
///
/// The payload is decoded with standard query-string semantics (duplicate
/// keys: last occurrence wins), canonicalized into the sorted check
/// string, and verified against the recomputed two-stage HMAC before the
/// embedded `user` value is trusted.
///
/// # Errors
///
/// - [`InitDataError::MissingSignature`] when no `hash` field is present
/// - [`InitDataError::InvalidSignature`] when the recomputed signature
///   mismatches
/// - [`InitDataError::MissingIdentity`] when `user` is absent, is not
///   valid JSON, or carries no non-zero `id`
pub fn validate_init_data(
    init_data: &str,
    bot_token: &str,
) -> Result<TelegramUser, InitDataError> {
    let mut fields: BTreeMap<String, String> = url::form_urlencoded::parse(init_data.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let supplied = fields.remove(HASH_KEY).ok_or(InitDataError::MissingSignature)?;

    let expected = sign_check_string(&data_check_string(&fields), bot_token)
        .ok_or(InitDataError::InvalidSignature)?;

    if !timing_safe_eq(&expected, &supplied) {
        return Err(InitDataError::InvalidSignature);
    }

    let claim = fields.get(USER_KEY).ok_or(InitDataError::MissingIdentity)?;
    let user: TelegramUser =
        serde_json::from_str(claim).map_err(|_| InitDataError::MissingIdentity)?;

    if user.id.0 == 0 {
        return Err(InitDataError::MissingIdentity);
    }

    Ok(user)
}

/// Builds the canonical check string: fields sorted byte-wise by key,
/// rendered as `key=value` lines joined by single newlines, no trailing
/// newline. `BTreeMap` iteration order provides the sort.
fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("\n")
}

/// Computes the lowercase-hex candidate signature for a check string.
fn sign_check_string(check_string: &str, bot_token: &str) -> Option<String> {
    let secret_key = hmac_sha256(KEY_DERIVATION_TAG, bot_token.as_bytes())?;
    Some(hex::encode(hmac_sha256(&secret_key, check_string.as_bytes())?))
}

/// HMAC-SHA256 raw digest. Key construction accepts any key length, so
/// `None` is unreachable in practice; callers fold it into a signature
/// mismatch rather than panicking.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(data);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Timing-safe string comparison.
///
/// The threat model does not strictly require it (the secret is never
/// derivable from the hash), but constant-time comparison costs nothing
/// here.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
