//! Admin API authentication
//!
//! Ghost authenticates Admin API requests with a short-lived HS256 JWT signed
//! by the secret half of an `id:secret` admin key. The key id travels in the
//! token header so the server can pick the matching secret.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ghostkit_domain::constants::{ADMIN_AUDIENCE, TOKEN_LIFETIME_SECS, TOKEN_REFRESH_MARGIN_SECS};
use ghostkit_domain::{GhostError, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::InfraError;

const INVALID_FORMAT: &str = "Invalid API key format. Expected 'id:secret'";
const INVALID_SECRET: &str = "Invalid API key secret. Expected hex string.";

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a token that is valid for at least one more request.
    async fn access_token(&self) -> Result<String>;
}

/// A parsed Admin API key
#[derive(Clone, PartialEq, Eq)]
pub struct AdminApiKey {
    key_id: String,
    secret: Vec<u8>,
}

impl AdminApiKey {
    /// Parse an `id:secret` admin key.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Config` when the string is not exactly two
    /// non-empty parts or the secret is not hex.
    pub fn parse(raw: &str) -> Result<Self> {
        let (key_id, secret_hex) =
            raw.trim().split_once(':').ok_or_else(|| GhostError::Config(INVALID_FORMAT.into()))?;

        if secret_hex.contains(':') {
            return Err(GhostError::Config(INVALID_FORMAT.into()));
        }
        if key_id.is_empty() {
            return Err(GhostError::Config("Invalid API key: key id is missing".into()));
        }
        if secret_hex.is_empty() {
            return Err(GhostError::Config(INVALID_SECRET.into()));
        }

        let secret =
            hex::decode(secret_hex).map_err(|_| GhostError::Config(INVALID_SECRET.into()))?;

        Ok(Self { key_id: key_id.to_string(), secret })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl FromStr for AdminApiKey {
    type Err = GhostError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for AdminApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminApiKey")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// JWT claims Ghost expects on Admin API tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

/// A signed token together with its validity window
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SignedToken {
    /// True while more than `margin` of validity is left at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at - now > margin
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedToken")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Sign an Admin API token issued at `issued_at` (second precision).
///
/// The token expires [`TOKEN_LIFETIME_SECS`] after issuance. Identical
/// inputs produce identical tokens.
pub fn sign(key: &AdminApiKey, audience: &str, issued_at: DateTime<Utc>) -> Result<SignedToken> {
    let iat = issued_at.timestamp();
    let exp = iat + TOKEN_LIFETIME_SECS;

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(key.key_id.clone());
    header.typ = Some("JWT".to_string());

    let claims = AdminClaims { iat, exp, aud: audience.to_string() };
    let token = encode(&header, &claims, &EncodingKey::from_secret(key.secret()))
        .map_err(|err| GhostError::from(InfraError::from(err)))?;

    let to_datetime = |secs: i64| {
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| GhostError::Config(format!("token timestamp out of range: {secs}")))
    };

    Ok(SignedToken { token, issued_at: to_datetime(iat)?, expires_at: to_datetime(exp)? })
}

/// Sign a token issued now.
pub fn sign_now(key: &AdminApiKey, audience: &str) -> Result<SignedToken> {
    sign(key, audience, Utc::now())
}

/// Token provider that signs admin tokens locally and caches them.
///
/// A cached token is reused until it is within the refresh margin of expiry,
/// so no request ever leaves with a token that could expire in flight.
pub struct AdminTokenProvider {
    key: AdminApiKey,
    audience: String,
    refresh_margin: Duration,
    cached: Mutex<Option<SignedToken>>,
}

impl AdminTokenProvider {
    pub fn new(key: AdminApiKey) -> Self {
        Self {
            key,
            audience: ADMIN_AUDIENCE.to_string(),
            refresh_margin: Duration::seconds(TOKEN_REFRESH_MARGIN_SECS),
            cached: Mutex::new(None),
        }
    }

    /// Parse `id:secret` and build a provider for it.
    pub fn from_key(raw: &str) -> Result<Self> {
        AdminApiKey::parse(raw).map(Self::new)
    }

    pub fn key_id(&self) -> &str {
        self.key.key_id()
    }

    /// Return the cached token if still fresh at `now`, otherwise sign a new one.
    pub fn token_at(&self, now: DateTime<Utc>) -> Result<SignedToken> {
        let mut cached = self.cached.lock();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh_at(now, self.refresh_margin)) {
            return Ok(token.clone());
        }

        let token = sign(&self.key, &self.audience, now)?;
        debug!(key_id = %self.key.key_id, expires_at = %token.expires_at, "signed admin token");
        *cached = Some(token.clone());
        Ok(token)
    }

    pub fn cached_token(&self) -> Option<SignedToken> {
        self.cached.lock().clone()
    }

    /// Drop the cached token so the next request signs a fresh one.
    pub fn invalidate(&self) {
        self.cached.lock().take();
    }
}

impl fmt::Debug for AdminTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminTokenProvider")
            .field("key", &self.key)
            .field("audience", &self.audience)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenProvider for AdminTokenProvider {
    async fn access_token(&self) -> Result<String> {
        self.token_at(Utc::now()).map(|signed| signed.token)
    }
}
