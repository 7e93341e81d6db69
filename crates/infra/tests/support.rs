//! Shared fixtures for the Admin API integration tests.

use std::sync::Arc;

use ghostkit_domain::constants::ADMIN_AUDIENCE;
use ghostkit_domain::{BatchConfig, JsonObject};
use ghostkit_infra::api::auth::AdminClaims;
use ghostkit_infra::{AdminClient, AdminTokenProvider, GhostAdminApi};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use wiremock::{Match, MockServer, Request};

pub const TEST_KEY_ID: &str = "650b7a9f8e8c1234567890ab";
pub const TEST_SECRET_HEX: &str =
    "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

pub fn test_key() -> String {
    format!("{TEST_KEY_ID}:{TEST_SECRET_HEX}")
}

/// Route client logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// API client pointed at a mock server, signing real admin tokens.
pub fn api_for(server: &MockServer) -> GhostAdminApi {
    api_with_batch(server, BatchConfig::default())
}

pub fn api_with_batch(server: &MockServer, batch: BatchConfig) -> GhostAdminApi {
    init_tracing();
    let client = AdminClient::builder()
        .api_url(server.uri())
        .admin_api_key(test_key())
        .allow_insecure_http()
        .build()
        .expect("client should build");

    GhostAdminApi::new(client).with_batch_config(batch)
}

/// Same as [`api_for`] but reusing an explicit token provider.
pub fn api_with_provider(server: &MockServer, provider: Arc<AdminTokenProvider>) -> GhostAdminApi {
    init_tracing();
    let client = AdminClient::builder()
        .api_url(server.uri())
        .auth(provider)
        .allow_insecure_http()
        .build()
        .expect("client should build");

    GhostAdminApi::new(client)
}

/// Matches requests carrying `Authorization: Ghost <token>` where the token
/// verifies against the test secret, like Ghost itself would check it.
pub struct ValidAdminToken;

impl Match for ValidAdminToken {
    fn matches(&self, request: &Request) -> bool {
        let Some(token) = request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Ghost "))
        else {
            return false;
        };

        let Ok(header) = decode_header(token) else {
            return false;
        };
        if header.kid.as_deref() != Some(TEST_KEY_ID) {
            return false;
        }

        let secret = hex::decode(TEST_SECRET_HEX).expect("test secret is hex");
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[ADMIN_AUDIENCE]);
        validation.leeway = 0;

        decode::<AdminClaims>(token, &DecodingKey::from_secret(&secret), &validation)
            .map(|data| data.claims.exp - data.claims.iat == 300)
            .unwrap_or(false)
    }
}

/// Parse the JSON body of a received request.
pub fn body_of(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}

pub fn object(value: Value) -> JsonObject {
    value.as_object().cloned().expect("value should be an object")
}
