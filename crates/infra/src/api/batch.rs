//! Concurrent batches of independent reads
//!
//! A batch runs up to `max_parallel` reads at a time and reports every
//! outcome in submission order. One failed read never cancels the others.

use std::fmt;

use futures::stream::{self, StreamExt};
use ghostkit_domain::{
    ActivityPubStats, EmailStats, GhostError, JsonObject, MemberCounts, Mrr, PostCounts, Result,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use super::resources::GhostAdminApi;

/// A read-only operation that can be part of a batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadOperation {
    Site,
    PostsCount,
    LatestPost,
    Post(String),
    MembersCount,
    Mrr,
    Newsletters,
    LatestEmail,
    CommentsCount,
    Tiers,
    ActivityPubStats,
}

impl ReadOperation {
    /// Every parameterless read, in a stable order.
    pub const SUMMARY: [Self; 10] = [
        Self::Site,
        Self::PostsCount,
        Self::LatestPost,
        Self::MembersCount,
        Self::Mrr,
        Self::Newsletters,
        Self::LatestEmail,
        Self::CommentsCount,
        Self::Tiers,
        Self::ActivityPubStats,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::PostsCount => "posts_count",
            Self::LatestPost => "latest_post",
            Self::Post(_) => "post",
            Self::MembersCount => "members_count",
            Self::Mrr => "mrr",
            Self::Newsletters => "newsletters",
            Self::LatestEmail => "latest_email",
            Self::CommentsCount => "comments_count",
            Self::Tiers => "tiers",
            Self::ActivityPubStats => "activitypub_stats",
        }
    }
}

impl fmt::Display for ReadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => write!(f, "post({id})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of one successful [`ReadOperation`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadOutput {
    Site(JsonObject),
    PostsCount(PostCounts),
    LatestPost(Option<JsonObject>),
    Post(JsonObject),
    MembersCount(MemberCounts),
    Mrr(Mrr),
    Newsletters(Vec<JsonObject>),
    LatestEmail(Option<EmailStats>),
    CommentsCount(u64),
    Tiers(Vec<JsonObject>),
    ActivityPubStats(ActivityPubStats),
}

/// Outcome of one batch member, attributable to its submission slot
#[derive(Debug)]
pub struct BatchEntry {
    /// Position in the submitted operation list
    pub index: usize,
    pub operation: ReadOperation,
    pub result: Result<ReadOutput>,
}

/// Outcomes of a batch, in submission order
#[derive(Debug, Default)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&ReadOperation, &ReadOutput)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok().map(|out| (&entry.operation, out)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&ReadOperation, &GhostError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().err().map(|err| (&entry.operation, err)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    /// Output of the first successful entry for `operation`, if any.
    pub fn output(&self, operation: &ReadOperation) -> Option<&ReadOutput> {
        self.succeeded().find(|(op, _)| *op == operation).map(|(_, out)| out)
    }

    pub fn into_results(self) -> Vec<Result<ReadOutput>> {
        self.entries.into_iter().map(|entry| entry.result).collect()
    }

    /// Summary keyed by operation; failed reads become `{"error", "kind"}`.
    ///
    /// A repeated operation keeps its first key; later repeats are keyed
    /// `operation#index` so no outcome is dropped.
    pub fn to_json(&self) -> Value {
        let mut summary = Map::new();
        for entry in &self.entries {
            let value = match &entry.result {
                Ok(output) => serde_json::to_value(output).unwrap_or(Value::Null),
                Err(err) => json!({ "error": err.to_string(), "kind": err.kind() }),
            };
            let mut key = entry.operation.to_string();
            if summary.contains_key(&key) {
                key = format!("{key}#{}", entry.index);
            }
            summary.insert(key, value);
        }
        Value::Object(summary)
    }
}

impl GhostAdminApi {
    /// Run a single read.
    pub async fn read(&self, operation: &ReadOperation) -> Result<ReadOutput> {
        Ok(match operation {
            ReadOperation::Site => ReadOutput::Site(self.get_site().await?),
            ReadOperation::PostsCount => ReadOutput::PostsCount(self.get_posts_count().await?),
            ReadOperation::LatestPost => ReadOutput::LatestPost(self.get_latest_post().await?),
            ReadOperation::Post(id) => ReadOutput::Post(self.get_post(id).await?),
            ReadOperation::MembersCount => {
                ReadOutput::MembersCount(self.get_members_count().await?)
            }
            ReadOperation::Mrr => ReadOutput::Mrr(self.get_mrr().await?),
            ReadOperation::Newsletters => ReadOutput::Newsletters(self.get_newsletters().await?),
            ReadOperation::LatestEmail => ReadOutput::LatestEmail(self.get_latest_email().await?),
            ReadOperation::CommentsCount => {
                ReadOutput::CommentsCount(self.get_comments_count().await?)
            }
            ReadOperation::Tiers => ReadOutput::Tiers(self.get_tiers().await?),
            ReadOperation::ActivityPubStats => {
                ReadOutput::ActivityPubStats(self.get_activitypub_stats().await?)
            }
        })
    }

    /// Run independent reads concurrently and collect every outcome.
    ///
    /// At most `max_parallel` reads are in flight. Entries come back in the
    /// order the operations were given, whatever order they completed in.
    #[instrument(skip(self, operations), fields(count = operations.len()))]
    pub async fn read_batch(&self, operations: Vec<ReadOperation>) -> BatchReport {
        let max_parallel = self.batch_config().max_parallel.max(1);
        debug!(max_parallel, "starting read batch");

        let entries: Vec<BatchEntry> = stream::iter(operations.into_iter().enumerate())
            .map(|(index, operation)| async move {
                let result = self.read(&operation).await;
                if let Err(err) = &result {
                    warn!(index, %operation, error = %err, "batch read failed");
                }
                BatchEntry { index, operation, result }
            })
            .buffered(max_parallel)
            .collect()
            .await;

        let report = BatchReport { entries };
        debug!(failed = report.failure_count(), "read batch finished");
        report
    }
}
