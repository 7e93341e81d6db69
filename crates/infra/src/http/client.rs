use std::time::Duration;

use ghostkit_domain::{GhostError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// Who is responsible for the underlying connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOwnership {
    /// Built by [`HttpClientBuilder`]; released with the client.
    Owned,
    /// Supplied by the caller; the caller keeps it alive.
    Shared,
}

/// Outcome of [`HttpClient::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolRelease {
    /// The client owned the pool and dropped its handle to it.
    Closed,
    /// The pool belongs to the caller and was left open.
    Retained,
}

/// HTTP client over a single reusable connection pool.
///
/// Requests are sent exactly once. Callers that want retries wrap the
/// operation themselves.
#[derive(Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    ownership: PoolOwnership,
}

impl HttpClient {
    /// Start building a new HTTP client with its own pool.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Wrap a caller-owned `reqwest::Client`. Releasing this client leaves
    /// the caller's pool untouched.
    pub fn shared(client: ReqwestClient) -> Self {
        Self { client, ownership: PoolOwnership::Shared }
    }

    pub fn ownership(&self) -> PoolOwnership {
        self.ownership
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder once.
    ///
    /// Any status code is returned as a response; only transport failures
    /// (connect, DNS, TLS, timeout) become errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(|err| GhostError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }

    /// Give up this handle on the pool.
    ///
    /// An owned pool is closed once its last handle is dropped, which is
    /// this one; a shared pool stays with its owner.
    pub fn release(self) -> PoolRelease {
        match self.ownership {
            PoolOwnership::Owned => {
                drop(self.client);
                debug!("closed owned HTTP connection pool");
                PoolRelease::Closed
            }
            PoolOwnership::Shared => PoolRelease::Retained,
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(ghostkit_domain::constants::DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("ghostkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let builder =
            ReqwestClient::builder().timeout(self.timeout).user_agent(self.user_agent).no_proxy();

        let client = builder.build().map_err(|err| GhostError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, ownership: PoolOwnership::Owned })
    }
}
