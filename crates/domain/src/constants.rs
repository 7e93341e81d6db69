//! Client constants
//!
//! Centralized location for Admin API paths, token parameters and defaults.

// Token signing
pub const ADMIN_AUDIENCE: &str = "/admin/";
pub const TOKEN_LIFETIME_SECS: i64 = 300;
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
pub const AUTH_SCHEME: &str = "Ghost";

// Transport defaults
pub const DEFAULT_ACCEPT_VERSION: &str = "v5.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_MAX_PARALLEL: usize = 8;
pub const ACCEPT_VERSION_HEADER: &str = "Accept-Version";
pub const ACTIVITY_JSON: &str = "application/activity+json";

// Admin API paths
pub const SITE_PATH: &str = "/ghost/api/admin/site/";
pub const POSTS_PATH: &str = "/ghost/api/admin/posts/";
pub const MEMBERS_COUNT_PATH: &str = "/ghost/api/admin/members/stats/count/";
pub const MEMBERS_MRR_PATH: &str = "/ghost/api/admin/members/stats/mrr/";
pub const NEWSLETTERS_PATH: &str = "/ghost/api/admin/newsletters/";
pub const COMMENTS_PATH: &str = "/ghost/api/admin/comments/";
pub const TIERS_PATH: &str = "/ghost/api/admin/tiers/";
pub const WEBHOOKS_PATH: &str = "/ghost/api/admin/webhooks/";
pub const ACTIVITYPUB_PREFIX: &str = "/.ghost/activitypub";

// Latest-email lookup scans this many recent posts for one sent by email
pub const LATEST_EMAIL_SCAN_LIMIT: u32 = 10;
