//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ACCEPT_VERSION, DEFAULT_BATCH_MAX_PARALLEL, DEFAULT_TIMEOUT_SECS};

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Site URL, e.g. `https://example.ghost.io`
    pub api_url: String,
    /// Admin API key in `id:secret` form
    #[serde(skip_serializing)]
    pub admin_api_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_accept_version")]
    pub accept_version: String,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Concurrency settings for batched reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub max_parallel: usize,
}

impl ClientConfig {
    /// Create a config with defaults for everything except URL and key.
    pub fn new(api_url: impl Into<String>, admin_api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            admin_api_key: admin_api_key.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            accept_version: DEFAULT_ACCEPT_VERSION.to_string(),
            batch: BatchConfig::default(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// The admin key is a credential; keep it out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("admin_api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("accept_version", &self.accept_version)
            .field("batch", &self.batch)
            .finish()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_parallel: DEFAULT_BATCH_MAX_PARALLEL }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_accept_version() -> String {
    DEFAULT_ACCEPT_VERSION.to_string()
}
