//! Request and response types for the Admin API
//!
//! Resource payloads (posts, newsletters, tiers, webhooks) are passed through
//! as [`JsonObject`]s; the server owns their schema. Only values the client
//! derives or assembles itself get dedicated types.

pub mod posts;
pub mod stats;
pub mod webhooks;

use serde_json::{Map, Value};

pub use posts::{NewPost, PostStatus, PostUpdate};
pub use stats::{mrr_from_stats, ActivityPubStats, EmailStats, MemberCounts, Mrr, PostCounts};
pub use webhooks::NewWebhook;

/// A JSON object as returned by the Admin API
pub type JsonObject = Map<String, Value>;

/// Read a non-negative integer field, treating absent or malformed values as 0.
pub fn count_field(object: &JsonObject, key: &str) -> u64 {
    object.get(key).map_or(0, value_as_count)
}

/// Read `meta.pagination.total` from a browse envelope.
pub fn pagination_total(envelope: &JsonObject) -> u64 {
    envelope
        .get("meta")
        .and_then(|meta| meta.get("pagination"))
        .and_then(|pagination| pagination.get("total"))
        .map_or(0, value_as_count)
}

/// Take the first element of a resource array, e.g. `posts[0]`.
pub fn first_resource(envelope: &JsonObject, key: &str) -> Option<JsonObject> {
    envelope
        .get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .cloned()
}

/// Take a resource array as a list of objects, skipping non-object entries.
pub fn resource_list(envelope: &JsonObject, key: &str) -> Vec<JsonObject> {
    envelope
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn value_as_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
