//! Shared helpers for endpoint integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::Request,
    response::Response,
    Router,
};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha256;
use soma_api::{create_router, AppState, Config};

type HmacSha256 = Hmac<Sha256>;

/// Bot token every test payload is signed with.
pub const BOT_TOKEN: &str = "123456:TEST-TOKEN";

/// Service-role key the test storage expects.
pub const SERVICE_KEY: &str = "service-role-test-key";

/// Fully-populated configuration pointing storage at `supabase_url`.
pub fn test_config(supabase_url: &str) -> Config {
    Config {
        bot_token: Some(BOT_TOKEN.to_string()),
        supabase_url: Some(supabase_url.to_string()),
        supabase_service_role_key: Some(SERVICE_KEY.to_string()),
        request_timeout: 5,
        ..Config::default()
    }
}

/// Router over a fully-configured state.
pub fn test_router(supabase_url: &str) -> Router {
    create_router(AppState::new(test_config(supabase_url)).expect("client builds"))
}

/// Router over a state with the given configuration.
pub fn router_with_config(config: Config) -> Router {
    create_router(AppState::new(config).expect("client builds"))
}

/// Builds a signed `initData` payload the way the external signer would:
/// canonicalize the sorted pairs, run the two-stage HMAC, URL-encode the
/// pairs plus the resulting `hash`.
pub fn signed_init_data(pairs: &[(&str, &str)]) -> String {
    signed_init_data_with_token(pairs, BOT_TOKEN)
}

/// Same as [`signed_init_data`] with an explicit signing token.
pub fn signed_init_data_with_token(pairs: &[(&str, &str)], bot_token: &str) -> String {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let check_string =
        sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("\n");

    let secret_key = hmac_sha256(b"WebAppData", bot_token.as_bytes());
    let hash = hex::encode(hmac_sha256(&secret_key, check_string.as_bytes()));

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// POST request with a JSON string body.
pub fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

/// Collects a response body into bytes.
pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.expect("body collects").to_bytes()
}

/// Collects a response body into a UTF-8 string.
pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("body is UTF-8")
}
