//! Error types used throughout the client
//!
//! Every failure surfaces as a [`GhostError`]. Callers that only care about
//! the broad class of failure match on [`GhostError::kind`]; callers that need
//! the server payload match on the variant itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Broad classes of client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostErrorKind {
    /// Bad credentials format, URL or config - raised before any network call
    Configuration,
    /// DNS, TCP, TLS or timeout failures - potentially transient
    Connection,
    /// 401/403 - not retryable without new credentials
    Auth,
    /// 404 - resource absent
    NotFound,
    /// 400/422 - payload rejected by the server
    Validation,
    /// Any other non-2xx response or an unreadable body
    Api,
}

/// One entry of the `errors` array Ghost returns with failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

/// Main error type for Ghost Admin API operations
#[derive(Error, Debug)]
pub enum GhostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed: {message}")]
    Auth { status: Option<u16>, message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String, message: String },

    #[error("Validation failed: {message}")]
    Validation {
        status: u16,
        message: String,
        errors: Vec<ServerErrorDetail>,
        payload: Option<Value>,
    },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String, body: Option<Value> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GhostError {
    /// Get the broad class of this error
    pub fn kind(&self) -> GhostErrorKind {
        match self {
            Self::Config(_) => GhostErrorKind::Configuration,
            Self::Connection(_) => GhostErrorKind::Connection,
            Self::Auth { .. } => GhostErrorKind::Auth,
            Self::NotFound { .. } => GhostErrorKind::NotFound,
            Self::Validation { .. } => GhostErrorKind::Validation,
            Self::Api { .. } | Self::InvalidResponse(_) => GhostErrorKind::Api,
        }
    }

    /// HTTP status code, when the error came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Config(_) | Self::Connection(_) | Self::InvalidResponse(_) => None,
        }
    }

    /// Raw server payload, when one was returned and parsed as JSON
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Validation { payload, .. } => payload.as_ref(),
            Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Server-provided validation messages (empty for other variants)
    pub fn validation_messages(&self) -> Vec<&str> {
        match self {
            Self::Validation { errors, .. } => {
                errors.iter().map(|detail| detail.message.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Only connection-level failures may succeed on a plain retry.
    pub fn is_retryable(&self) -> bool {
        self.kind() == GhostErrorKind::Connection
    }
}

/// Result type alias for Ghost operations
pub type Result<T> = std::result::Result<T, GhostError>;
