//! Webhook inputs

use serde_json::Value;

use super::JsonObject;

/// A webhook subscription to register with Ghost.
///
/// Ghost attaches the webhook to the integration that owns the API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWebhook {
    /// Event name, e.g. `member.added` or `post.published`
    pub event: String,
    /// URL Ghost will POST payloads to
    pub target_url: String,
    pub name: Option<String>,
    /// Shared secret Ghost uses to sign deliveries
    pub secret: Option<String>,
}

impl NewWebhook {
    pub fn new(event: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self { event: event.into(), target_url: target_url.into(), name: None, secret: None }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn to_payload(&self) -> JsonObject {
        let mut webhook = JsonObject::new();
        webhook.insert("event".into(), Value::String(self.event.clone()));
        webhook.insert("target_url".into(), Value::String(self.target_url.clone()));
        if let Some(name) = &self.name {
            webhook.insert("name".into(), Value::String(name.clone()));
        }
        if let Some(secret) = &self.secret {
            webhook.insert("secret".into(), Value::String(secret.clone()));
        }
        webhook
    }
}
