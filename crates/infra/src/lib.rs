//! # ghostkit infrastructure
//!
//! Network-facing half of the Ghost Admin API client.
//!
//! This crate contains:
//! - The admin token signer and token cache
//! - The pooled HTTP client and the authenticated transport
//! - Typed resource operations and concurrent read batches
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Types, errors and payload builders live in `ghostkit-domain`
//! - Everything here that performs I/O is `async` on tokio

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, AdminApiKey, AdminClient, AdminClientBuilder, AdminTokenProvider,
    BatchEntry, BatchReport, GhostAdminApi, ReadOperation, ReadOutput,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, PoolOwnership, PoolRelease};
