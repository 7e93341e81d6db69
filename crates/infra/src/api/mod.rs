//! Ghost Admin API client
//!
//! Layers, bottom up:
//!
//! - [`auth`]: signs short-lived admin tokens and caches them
//! - [`client`]: authenticated transport over the pooled HTTP client
//! - [`errors`]: maps error responses to [`ghostkit_domain::GhostError`]
//! - [`resources`]: one typed method per Admin API operation
//! - [`batch`]: concurrent reads with per-operation results

pub mod auth;
pub mod batch;
pub mod client;
pub mod errors;
pub mod resources;

pub use auth::{sign, sign_now, AccessTokenProvider, AdminApiKey, AdminTokenProvider, SignedToken};
pub use batch::{BatchEntry, BatchReport, ReadOperation, ReadOutput};
pub use client::{AdminClient, AdminClientBuilder, AdminClientConfig};
pub use errors::{map_response, map_status_error};
pub use resources::GhostAdminApi;
