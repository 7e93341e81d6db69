//! Statistics derived from Admin API responses
//!
//! Ghost reports most numbers inside larger envelopes (pagination metadata,
//! time series). These types hold the values the client extracts from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{count_field, JsonObject};

/* -------------------------------------------------------------------------- */
/* Posts */
/* -------------------------------------------------------------------------- */

/// Post totals by publication state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    pub published: u64,
    pub drafts: u64,
    pub scheduled: u64,
}

/* -------------------------------------------------------------------------- */
/* Members */
/* -------------------------------------------------------------------------- */

/// Member totals from `members/stats/count`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub total: u64,
    pub paid: u64,
    pub free: u64,
    pub comped: u64,
}

impl MemberCounts {
    /// Use `total` and the most recent entry of the `data` history.
    ///
    /// An empty history yields zero paid/free/comped counts.
    pub fn from_stats(stats: &JsonObject) -> Self {
        let total = count_field(stats, "total");
        let latest = stats
            .get("data")
            .and_then(Value::as_array)
            .and_then(|history| history.last())
            .and_then(Value::as_object);

        match latest {
            Some(latest) => Self {
                total,
                paid: count_field(latest, "paid"),
                free: count_field(latest, "free"),
                comped: count_field(latest, "comped"),
            },
            None => Self { total, ..Self::default() },
        }
    }
}

/// Monthly recurring revenue in the smallest currency unit, keyed by currency
pub type Mrr = BTreeMap<String, u64>;

/// Latest MRR value per currency from `members/stats/mrr`.
///
/// Currencies without any data points are omitted.
pub fn mrr_from_stats(stats: &JsonObject) -> Mrr {
    let mut result = Mrr::new();
    let series = stats.get("data").and_then(Value::as_array).into_iter().flatten();

    for entry in series.filter_map(Value::as_object) {
        let currency = entry.get("currency").and_then(Value::as_str).unwrap_or("usd").to_string();
        let latest =
            entry.get("data").and_then(Value::as_array).and_then(|points| points.last());
        if let Some(point) = latest.and_then(Value::as_object) {
            result.insert(currency, count_field(point, "value"));
        }
    }
    result
}

/* -------------------------------------------------------------------------- */
/* Email */
/* -------------------------------------------------------------------------- */

/// Delivery and engagement numbers of a post sent as a newsletter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailStats {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<String>,
    pub subject: Option<String>,
    pub submitted_at: Option<String>,
    pub email_count: u64,
    pub delivered_count: u64,
    pub opened_count: u64,
    pub clicked_count: u64,
    pub failed_count: u64,
    /// Percentage of recipients that opened, rounded
    pub open_rate: u64,
    /// Percentage of recipients that clicked, rounded
    pub click_rate: u64,
}

impl EmailStats {
    /// Build stats from a post browsed with `include=email,count.clicks`.
    ///
    /// Returns `None` when the post was never sent by email.
    pub fn from_post(post: &JsonObject) -> Option<Self> {
        let email = post.get("email").and_then(Value::as_object)?;
        if email.is_empty() {
            return None;
        }

        let email_count = count_field(email, "email_count");
        let opened_count = count_field(email, "opened_count");
        let clicked_count =
            post.get("count").and_then(Value::as_object).map_or(0, |c| count_field(c, "clicks"));

        Some(Self {
            title: string_field(post, "title"),
            slug: string_field(post, "slug"),
            published_at: string_field(post, "published_at"),
            subject: string_field(email, "subject"),
            submitted_at: string_field(email, "submitted_at"),
            email_count,
            delivered_count: count_field(email, "delivered_count"),
            opened_count,
            clicked_count,
            failed_count: count_field(email, "failed_count"),
            open_rate: rate(opened_count, email_count),
            click_rate: rate(clicked_count, email_count),
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Federation */
/* -------------------------------------------------------------------------- */

/// ActivityPub follower/following totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPubStats {
    pub followers: u64,
    pub following: u64,
}

fn string_field(object: &JsonObject, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

// Percentage rounded half-to-even; 0 when nothing was sent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn rate(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round_ties_even() as u64
}
