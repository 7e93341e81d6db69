//! Conversions from external infrastructure errors into client errors.

use ghostkit_domain::GhostError;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps third-party conversions on the infrastructure
/// side and can be converted back into [`GhostError`].
#[derive(Debug)]
pub struct InfraError(pub GhostError);

impl From<InfraError> for GhostError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GhostError> for InfraError {
    fn from(value: GhostError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGhostError {
    fn into_ghost(self) -> GhostError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GhostError */
/* -------------------------------------------------------------------------- */

impl IntoGhostError for HttpError {
    fn into_ghost(self) -> GhostError {
        let target = self.url().map(|url| format!(" ({url})")).unwrap_or_default();

        if self.is_builder() {
            return GhostError::Config(format!("invalid HTTP request{target}: {self}"));
        }
        if self.is_timeout() {
            return GhostError::Connection(format!("request timed out{target}"));
        }
        if self.is_decode() {
            return GhostError::InvalidResponse(format!("unreadable response body{target}: {self}"));
        }
        if self.is_connect() {
            return GhostError::Connection(format!("could not connect{target}: {self}"));
        }
        GhostError::Connection(format!("HTTP transport failed{target}: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_ghost())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GhostError */
/* -------------------------------------------------------------------------- */

impl IntoGhostError for serde_json::Error {
    fn into_ghost(self) -> GhostError {
        GhostError::InvalidResponse(format!("response is not valid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.into_ghost())
    }
}

/* -------------------------------------------------------------------------- */
/* jsonwebtoken::Error → GhostError */
/* -------------------------------------------------------------------------- */

impl IntoGhostError for JwtError {
    fn into_ghost(self) -> GhostError {
        match self.kind() {
            JwtErrorKind::InvalidKeyFormat | JwtErrorKind::InvalidEcdsaKey => {
                GhostError::Config("admin API secret cannot be used as a signing key".into())
            }
            _ => GhostError::Config(format!("failed to sign admin token: {self}")),
        }
    }
}

impl From<JwtError> for InfraError {
    fn from(value: JwtError) -> Self {
        Self(value.into_ghost())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → GhostError */
/* -------------------------------------------------------------------------- */

impl IntoGhostError for UrlError {
    fn into_ghost(self) -> GhostError {
        GhostError::Config(format!("invalid API URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        Self(value.into_ghost())
    }
}
