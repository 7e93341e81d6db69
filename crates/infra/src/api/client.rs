//! Admin API transport
//!
//! Every Admin API call goes through [`AdminClient::request`]: it signs the
//! request, sends it once over the pooled [`HttpClient`] and turns the
//! response into either a JSON object or a typed [`GhostError`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ghostkit_domain::constants::{
    ACCEPT_VERSION_HEADER, AUTH_SCHEME, DEFAULT_ACCEPT_VERSION, DEFAULT_TIMEOUT_SECS,
};
use ghostkit_domain::{ClientConfig, GhostError, JsonObject, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{AccessTokenProvider, AdminTokenProvider};
use super::errors::map_response;
use crate::errors::InfraError;
use crate::http::{HttpClient, PoolRelease};

/// Resolved transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClientConfig {
    /// Site origin without a trailing slash
    pub base_url: String,
    pub accept_version: String,
    /// Applied to every request, including reading the body
    pub timeout: Duration,
}

/// Authenticated transport for one Ghost site.
pub struct AdminClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    config: AdminClientConfig,
}

impl AdminClient {
    pub fn builder() -> AdminClientBuilder {
        AdminClientBuilder::default()
    }

    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Config` for a malformed URL or key.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        AdminClientBuilder::from_config(config).build()
    }

    pub fn config(&self) -> &AdminClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Send an authenticated request and return the response object.
    ///
    /// A 2xx response with an empty body yields an empty object. Non-2xx
    /// responses go through the error mapper; transport failures and
    /// timeouts surface as `GhostError::Connection`.
    #[instrument(skip(self, query, body), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<JsonObject> {
        let token = self.auth.access_token().await?;

        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(AUTHORIZATION, format!("{AUTH_SCHEME} {token}"))
            .header(ACCEPT_VERSION_HEADER, &self.config.accept_version)
            .timeout(self.config.timeout);

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        read_object(response, path).await
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<JsonObject> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<JsonObject> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<JsonObject> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<JsonObject> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Fetch an unauthenticated endpoint on the same site.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_public(&self, path: &str, accept: &str) -> Result<JsonObject> {
        let builder = self
            .http
            .request(Method::GET, self.url(path))
            .header(ACCEPT, accept)
            .timeout(self.config.timeout);

        let response = self.http.send(builder).await?;
        read_object(response, path).await
    }

    /// Close the client, releasing its connection pool if it owns one.
    pub fn close(self) -> PoolRelease {
        let release = self.http.release();
        debug!(base_url = %self.config.base_url, ?release, "admin client closed");
        release
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

impl fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminClient")
            .field("config", &self.config)
            .field("pool", &self.http.ownership())
            .finish_non_exhaustive()
    }
}

async fn read_object(response: Response, path: &str) -> Result<JsonObject> {
    let status = response.status();
    let text = response.text().await.map_err(|err| GhostError::from(InfraError::from(err)))?;

    if let Some(err) = map_response(status, path, &text) {
        debug!(%status, error = %err, "Admin API request failed");
        return Err(err);
    }

    parse_object(&text)
}

/// Parse a successful response body, treating an empty body as `{}`.
pub(crate) fn parse_object(text: &str) -> Result<JsonObject> {
    if text.trim().is_empty() {
        return Ok(JsonObject::new());
    }

    match serde_json::from_str::<Value>(text).map_err(|err| GhostError::from(InfraError::from(err)))? {
        Value::Object(object) => Ok(object),
        other => {
            warn!(kind = json_kind(&other), "response body is not a JSON object");
            Err(GhostError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builder for [`AdminClient`]
#[derive(Default)]
pub struct AdminClientBuilder {
    api_url: Option<String>,
    admin_api_key: Option<String>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
    accept_version: Option<String>,
    allow_insecure_http: bool,
}

impl AdminClientBuilder {
    /// Seed a builder from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::default()
            .api_url(&config.api_url)
            .admin_api_key(&config.admin_api_key)
            .timeout(config.timeout())
            .accept_version(&config.accept_version)
    }

    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Admin API key in `id:secret` form; parsed by [`Self::build`].
    #[must_use]
    pub fn admin_api_key(mut self, key: impl Into<String>) -> Self {
        self.admin_api_key = Some(key.into());
        self
    }

    /// Use a custom token provider instead of signing with an admin key.
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Send requests over a caller-owned pool. Closing the client leaves it open.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn accept_version(mut self, version: impl Into<String>) -> Self {
        self.accept_version = Some(version.into());
        self
    }

    /// Accept `http://` site URLs. Meant for local development and tests.
    #[must_use]
    pub fn allow_insecure_http(mut self) -> Self {
        self.allow_insecure_http = true;
        self
    }

    /// Validate the settings and build the client.
    ///
    /// Nothing is sent over the network here.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Config` if the URL or key is missing or malformed.
    pub fn build(self) -> Result<AdminClient> {
        let raw_url =
            self.api_url.ok_or_else(|| GhostError::Config("API URL not set".to_string()))?;
        let base_url = normalize_base_url(&raw_url, self.allow_insecure_http)?;

        let auth: Arc<dyn AccessTokenProvider> = match (self.auth, self.admin_api_key) {
            (Some(auth), _) => auth,
            (None, Some(key)) => Arc::new(AdminTokenProvider::from_key(&key)?),
            (None, None) => return Err(GhostError::Config("Admin API key not set".to_string())),
        };

        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let http = match self.http_client {
            Some(client) => HttpClient::shared(client),
            None => HttpClient::builder().timeout(timeout).build()?,
        };

        let config = AdminClientConfig {
            base_url,
            accept_version: self
                .accept_version
                .unwrap_or_else(|| DEFAULT_ACCEPT_VERSION.to_string()),
            timeout,
        };
        debug!(base_url = %config.base_url, pool = ?http.ownership(), "admin client built");

        Ok(AdminClient { http, auth, config })
    }
}

fn normalize_base_url(raw: &str, allow_insecure_http: bool) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|err| GhostError::from(InfraError::from(err)))?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_insecure_http => {}
        "http" => {
            return Err(GhostError::Config(format!(
                "API URL must use https: {trimmed} (allow_insecure_http() permits http)"
            )))
        }
        scheme => {
            return Err(GhostError::Config(format!("Unsupported URL scheme '{scheme}' in {trimmed}")))
        }
    }

    if parsed.host_str().is_none() {
        return Err(GhostError::Config(format!("API URL has no host: {trimmed}")));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ghostkit_domain::GhostErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    #[derive(Clone)]
    struct MockAuthProvider {
        token: String,
    }

    #[async_trait]
    impl AccessTokenProvider for MockAuthProvider {
        async fn access_token(&self) -> Result<String> {
            Ok(self.token.clone())
        }
    }

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::builder()
            .api_url(server.uri())
            .auth(Arc::new(MockAuthProvider { token: "test-token".to_string() }))
            .allow_insecure_http()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_version_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ghost/api/admin/posts/"))
            .and(header("Authorization", "Ghost test-token"))
            .and(header("Accept-Version", "v5.0"))
            .and(query_param("limit", "1"))
            .and(|req: &Request| !req.headers.contains_key("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"posts": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get("/ghost/api/admin/posts/", &[("limit", "1".to_string())]).await;

        assert_eq!(result.unwrap().get("posts"), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock_server = MockServer::start().await;
        let payload = json!({"posts": [{"title": "Hello"}]});

        Mock::given(method("POST"))
            .and(path("/ghost/api/admin/posts/"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"posts": [{"id": "p1"}]})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.post("/ghost/api/admin/posts/", &payload).await.unwrap();

        assert_eq!(result["posts"][0]["id"], "p1");
    }

    #[tokio::test]
    async fn test_no_content_yields_empty_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/ghost/api/admin/posts/p1/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.delete("/ghost/api/admin/posts/p1/").await;

        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get("/ghost/api/admin/site/", &[]).await.unwrap_err();

        assert!(matches!(err, GhostError::InvalidResponse(ref msg) if msg.contains("an array")));
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ghost/api/admin/site/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/ghost/api/admin/posts/p1/"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "errors": [{"message": "Title is required"}]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let err = client.get("/ghost/api/admin/site/", &[]).await.unwrap_err();
        assert_eq!(err.kind(), GhostErrorKind::Auth);

        let err = client.put("/ghost/api/admin/posts/p1/", &json!({})).await.unwrap_err();
        assert_eq!(err.validation_messages(), vec!["Title is required"]);
    }

    #[tokio::test]
    async fn test_timeout_is_connection_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let client = AdminClient::builder()
            .api_url(mock_server.uri())
            .auth(Arc::new(MockAuthProvider { token: "t".to_string() }))
            .timeout(Duration::from_millis(200))
            .allow_insecure_http()
            .build()
            .unwrap();

        let err = client.get("/ghost/api/admin/site/", &[]).await.unwrap_err();
        assert_eq!(err.kind(), GhostErrorKind::Connection);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_get_public_skips_authorization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.ghost/activitypub/followers/index"))
            .and(header("Accept", "application/activity+json"))
            .and(|req: &Request| !req.headers.contains_key("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalItems": 3})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client
            .get_public("/.ghost/activitypub/followers/index", "application/activity+json")
            .await
            .unwrap();

        assert_eq!(result["totalItems"], 3);
    }

    #[test]
    fn test_builder_normalizes_url() {
        let client = AdminClient::builder()
            .api_url("https://demo.ghost.io/")
            .admin_api_key("abc:00ff")
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://demo.ghost.io");
        assert_eq!(client.config().accept_version, "v5.0");
        assert_eq!(client.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_rejects_bad_settings() {
        let cases = [
            AdminClient::builder().admin_api_key("abc:00ff"),
            AdminClient::builder().api_url("https://demo.ghost.io"),
            AdminClient::builder().api_url("not a url").admin_api_key("abc:00ff"),
            AdminClient::builder().api_url("http://demo.ghost.io").admin_api_key("abc:00ff"),
            AdminClient::builder().api_url("ftp://demo.ghost.io").admin_api_key("abc:00ff"),
            AdminClient::builder().api_url("https://demo.ghost.io").admin_api_key("no-colon"),
        ];

        for builder in cases {
            let err = builder.build().unwrap_err();
            assert_eq!(err.kind(), GhostErrorKind::Configuration, "{err}");
        }
    }

    #[test]
    fn test_close_releases_owned_pool_only() {
        let owned = AdminClient::builder()
            .api_url("https://demo.ghost.io")
            .admin_api_key("abc:00ff")
            .build()
            .unwrap();
        assert_eq!(owned.close(), PoolRelease::Closed);

        let shared = AdminClient::builder()
            .api_url("https://demo.ghost.io")
            .admin_api_key("abc:00ff")
            .http_client(reqwest::Client::new())
            .build()
            .unwrap();
        assert_eq!(shared.close(), PoolRelease::Retained);
    }

    #[test]
    fn test_parse_object_edge_cases() {
        assert!(parse_object("").unwrap().is_empty());
        assert!(parse_object("  \n").unwrap().is_empty());
        assert_eq!(parse_object("null").unwrap_err().kind(), GhostErrorKind::Api);
        assert_eq!(parse_object("{oops").unwrap_err().kind(), GhostErrorKind::Api);
    }
}
