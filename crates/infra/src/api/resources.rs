//! Typed Admin API operations
//!
//! [`GhostAdminApi`] maps each Ghost resource operation onto a transport
//! call and pulls the interesting part out of the response envelope.

use ghostkit_domain::constants::{
    ACTIVITYPUB_PREFIX, ACTIVITY_JSON, COMMENTS_PATH, LATEST_EMAIL_SCAN_LIMIT, MEMBERS_COUNT_PATH,
    MEMBERS_MRR_PATH, NEWSLETTERS_PATH, POSTS_PATH, SITE_PATH, TIERS_PATH, WEBHOOKS_PATH,
};
use ghostkit_domain::types::{count_field, first_resource, pagination_total, resource_list};
use ghostkit_domain::{
    mrr_from_stats, ActivityPubStats, BatchConfig, ClientConfig, EmailStats, GhostError,
    GhostErrorKind, JsonObject, MemberCounts, Mrr, NewPost, NewWebhook, PostCounts, PostStatus,
    PostUpdate, Result,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};
use urlencoding::encode;

use super::client::AdminClient;
use crate::http::PoolRelease;

/// High-level client for one Ghost site
#[derive(Debug)]
pub struct GhostAdminApi {
    client: AdminClient,
    batch: BatchConfig,
}

impl GhostAdminApi {
    pub fn new(client: AdminClient) -> Self {
        Self { client, batch: BatchConfig::default() }
    }

    /// Build the transport and API client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Config` for a malformed URL or key. No request
    /// is sent.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(AdminClient::from_config(config)?).with_batch_config(config.batch))
    }

    #[must_use]
    pub fn with_batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn batch_config(&self) -> BatchConfig {
        self.batch
    }

    /// Close the underlying transport. See [`AdminClient::close`].
    pub fn close(self) -> PoolRelease {
        self.client.close()
    }

    // === Site ===

    #[instrument(skip(self))]
    pub async fn get_site(&self) -> Result<JsonObject> {
        let data = self.client.get(SITE_PATH, &[]).await?;
        Ok(object_field(&data, "site"))
    }

    /// `Ok(false)` when the site rejects the credentials.
    ///
    /// Errors other than authentication failures are returned as-is, so an
    /// unreachable site is never reported as bad credentials.
    #[instrument(skip(self))]
    pub async fn validate_credentials(&self) -> Result<bool> {
        match self.get_site().await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == GhostErrorKind::Auth => {
                debug!(error = %err, "credentials rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    // === Posts ===

    /// Count posts by status with three concurrent requests.
    ///
    /// Fails as soon as any of the three fails.
    #[instrument(skip(self))]
    pub async fn get_posts_count(&self) -> Result<PostCounts> {
        let (published, drafts, scheduled) = tokio::try_join!(
            self.count_posts(PostStatus::Published),
            self.count_posts(PostStatus::Draft),
            self.count_posts(PostStatus::Scheduled),
        )?;

        Ok(PostCounts { published, drafts, scheduled })
    }

    #[instrument(skip(self))]
    pub async fn get_latest_post(&self) -> Result<Option<JsonObject>> {
        let query = [
            ("limit", "1".to_string()),
            ("order", "published_at desc".to_string()),
            ("filter", PostStatus::Published.filter()),
        ];
        let data = self.client.get(POSTS_PATH, &query).await?;
        Ok(first_resource(&data, "posts"))
    }

    /// # Errors
    ///
    /// `GhostError::NotFound` when no post has this id.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn get_post(&self, id: &str) -> Result<JsonObject> {
        let path = post_path(id);
        let data = self.client.get(&path, &[]).await?;
        single_resource(&data, "posts", &path)
    }

    #[instrument(skip(self, post), fields(title = %post.title, status = %post.status))]
    pub async fn create_post(&self, post: &NewPost) -> Result<JsonObject> {
        let body = json!({ "posts": [post.to_payload()] });
        let data = self.client.post(POSTS_PATH, &body).await?;
        let created = single_resource(&data, "posts", POSTS_PATH)?;

        info!(post_id = ?created.get("id"), "post created");
        Ok(created)
    }

    /// # Errors
    ///
    /// `GhostError::NotFound` when no post has this id.
    #[instrument(skip(self, update), fields(post_id = %id))]
    pub async fn update_post(&self, id: &str, update: &PostUpdate) -> Result<JsonObject> {
        if update.is_empty() {
            debug!("sending post update without changes");
        }

        let path = post_path(id);
        let body = json!({ "posts": [update.to_payload()] });
        let data = self.client.put(&path, &body).await?;
        let updated = single_resource(&data, "posts", &path)?;

        info!("post updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// `GhostError::NotFound` when no post has this id.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn delete_post(&self, id: &str) -> Result<()> {
        self.client.delete(&post_path(id)).await?;
        info!("post deleted");
        Ok(())
    }

    // === Members ===

    #[instrument(skip(self))]
    pub async fn get_members_count(&self) -> Result<MemberCounts> {
        let data = self.client.get(MEMBERS_COUNT_PATH, &[]).await?;
        Ok(MemberCounts::from_stats(&data))
    }

    /// Latest monthly recurring revenue per currency, in cents.
    #[instrument(skip(self))]
    pub async fn get_mrr(&self) -> Result<Mrr> {
        let data = self.client.get(MEMBERS_MRR_PATH, &[]).await?;
        Ok(mrr_from_stats(&data))
    }

    // === Newsletters and email ===

    #[instrument(skip(self))]
    pub async fn get_newsletters(&self) -> Result<Vec<JsonObject>> {
        let query = [("include", "count.members".to_string())];
        let data = self.client.get(NEWSLETTERS_PATH, &query).await?;
        Ok(resource_list(&data, "newsletters"))
    }

    /// Stats of the most recent published post that went out by email.
    ///
    /// Only the latest few published posts are scanned; `None` if none of
    /// them was emailed.
    #[instrument(skip(self))]
    pub async fn get_latest_email(&self) -> Result<Option<EmailStats>> {
        let query = [
            ("limit", LATEST_EMAIL_SCAN_LIMIT.to_string()),
            ("order", "published_at desc".to_string()),
            ("filter", PostStatus::Published.filter()),
            ("include", "email,count.clicks".to_string()),
        ];
        let data = self.client.get(POSTS_PATH, &query).await?;

        Ok(resource_list(&data, "posts").iter().find_map(EmailStats::from_post))
    }

    // === Comments and tiers ===

    #[instrument(skip(self))]
    pub async fn get_comments_count(&self) -> Result<u64> {
        let data = self.client.get(COMMENTS_PATH, &[("limit", "1".to_string())]).await?;
        Ok(pagination_total(&data))
    }

    #[instrument(skip(self))]
    pub async fn get_tiers(&self) -> Result<Vec<JsonObject>> {
        let data = self.client.get(TIERS_PATH, &[]).await?;
        Ok(resource_list(&data, "tiers"))
    }

    // === ActivityPub ===

    /// Follower and following totals from the site's public ActivityPub
    /// collections.
    ///
    /// A collection the site does not serve counts as 0. Connection
    /// failures are still returned as errors.
    #[instrument(skip(self))]
    pub async fn get_activitypub_stats(&self) -> Result<ActivityPubStats> {
        let (followers, following) = tokio::try_join!(
            self.activitypub_total("followers"),
            self.activitypub_total("following"),
        )?;

        Ok(ActivityPubStats { followers, following })
    }

    // === Webhooks ===

    #[instrument(skip(self, webhook), fields(event = %webhook.event))]
    pub async fn create_webhook(&self, webhook: &NewWebhook) -> Result<JsonObject> {
        let body = json!({ "webhooks": [webhook.to_payload()] });
        let data = self.client.post(WEBHOOKS_PATH, &body).await?;
        let created = single_resource(&data, "webhooks", WEBHOOKS_PATH)?;

        info!(webhook_id = ?created.get("id"), "webhook created");
        Ok(created)
    }

    #[instrument(skip(self), fields(webhook_id = %id))]
    pub async fn delete_webhook(&self, id: &str) -> Result<()> {
        let path = format!("{WEBHOOKS_PATH}{}/", encode(id));
        self.client.delete(&path).await?;
        info!("webhook deleted");
        Ok(())
    }

    async fn count_posts(&self, status: PostStatus) -> Result<u64> {
        let query = [("limit", "1".to_string()), ("filter", status.filter())];
        let data = self.client.get(POSTS_PATH, &query).await?;
        Ok(pagination_total(&data))
    }

    async fn activitypub_total(&self, collection: &str) -> Result<u64> {
        let path = format!("{ACTIVITYPUB_PREFIX}/{collection}/index");

        match self.client.get_public(&path, ACTIVITY_JSON).await {
            Ok(body) => Ok(count_field(&body, "totalItems")),
            Err(err) if err.kind() == GhostErrorKind::Connection => Err(err),
            Err(err) => {
                debug!(collection, error = %err, "ActivityPub collection not available");
                Ok(0)
            }
        }
    }
}

fn post_path(id: &str) -> String {
    format!("{POSTS_PATH}{}/", encode(id))
}

fn object_field(data: &JsonObject, key: &str) -> JsonObject {
    data.get(key).and_then(Value::as_object).cloned().unwrap_or_default()
}

fn single_resource(data: &JsonObject, key: &str, path: &str) -> Result<JsonObject> {
    first_resource(data, key).ok_or_else(|| {
        GhostError::InvalidResponse(format!("response from {path} has no {key} entry"))
    })
}
