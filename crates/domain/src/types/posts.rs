//! Post inputs
//!
//! [`NewPost`] and [`PostUpdate`] assemble the JSON object Ghost expects
//! inside `{"posts": [...]}`. Content is always sent as mobiledoc.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::JsonObject;
use crate::utils::mobiledoc::to_mobiledoc;

/// Publication state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
}

crate::impl_domain_status_conversions!(PostStatus {
    Draft => "draft",
    Published => "published",
    Scheduled => "scheduled",
});

impl PostStatus {
    /// NQL filter selecting posts in this state
    pub fn filter(self) -> String {
        format!("status:{self}")
    }
}

/// A post to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    /// HTML or Markdown body
    pub content: String,
    pub status: PostStatus,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub feature_image: Option<String>,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Draft post with only title and content set
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            status: PostStatus::Draft,
            slug: None,
            excerpt: None,
            feature_image: None,
            tags: Vec::new(),
            published_at: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    #[must_use]
    pub fn feature_image(mut self, url: impl Into<String>) -> Self {
        self.feature_image = Some(url.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Build the post object sent to the Admin API.
    ///
    /// Empty optional strings and an empty tag list are left out.
    pub fn to_payload(&self) -> JsonObject {
        let mut post = JsonObject::new();
        post.insert("title".into(), Value::String(self.title.clone()));
        post.insert("mobiledoc".into(), Value::String(to_mobiledoc(&self.content)));
        post.insert("status".into(), Value::String(self.status.to_string()));

        insert_non_empty(&mut post, "slug", self.slug.as_deref());
        insert_non_empty(&mut post, "custom_excerpt", self.excerpt.as_deref());
        insert_non_empty(&mut post, "feature_image", self.feature_image.as_deref());
        if !self.tags.is_empty() {
            post.insert("tags".into(), tag_list(&self.tags));
        }
        if let Some(at) = self.published_at {
            post.insert("published_at".into(), Value::String(format_timestamp(at)));
        }
        post
    }
}

/// Changes to apply to an existing post; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub feature_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published_at: Option<DateTime<Utc>>,
    /// Ghost's collision check: the `updated_at` of the version being edited
    pub updated_at: Option<String>,
}

impl PostUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    #[must_use]
    pub fn feature_image(mut self, url: impl Into<String>) -> Self {
        self.feature_image = Some(url.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    #[must_use]
    pub fn updated_at(mut self, updated_at: impl Into<String>) -> Self {
        self.updated_at = Some(updated_at.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build the partial post object sent to the Admin API.
    ///
    /// Unlike [`NewPost::to_payload`], an explicitly empty value is sent so
    /// callers can clear a field.
    pub fn to_payload(&self) -> JsonObject {
        let mut post = JsonObject::new();
        if let Some(title) = &self.title {
            post.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(content) = &self.content {
            post.insert("mobiledoc".into(), Value::String(to_mobiledoc(content)));
        }
        if let Some(status) = self.status {
            post.insert("status".into(), Value::String(status.to_string()));
        }
        if let Some(slug) = &self.slug {
            post.insert("slug".into(), Value::String(slug.clone()));
        }
        if let Some(excerpt) = &self.excerpt {
            post.insert("custom_excerpt".into(), Value::String(excerpt.clone()));
        }
        if let Some(image) = &self.feature_image {
            post.insert("feature_image".into(), Value::String(image.clone()));
        }
        if let Some(tags) = &self.tags {
            post.insert("tags".into(), tag_list(tags));
        }
        if let Some(at) = self.published_at {
            post.insert("published_at".into(), Value::String(format_timestamp(at)));
        }
        if let Some(updated_at) = &self.updated_at {
            post.insert("updated_at".into(), Value::String(updated_at.clone()));
        }
        post
    }
}

fn insert_non_empty(post: &mut JsonObject, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        post.insert(key.into(), Value::String(value.to_string()));
    }
}

fn tag_list(tags: &[String]) -> Value {
    Value::Array(tags.iter().map(|name| json!({ "name": name })).collect())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
