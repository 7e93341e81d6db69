//! Pooled HTTP client shared by every Admin API call

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, PoolOwnership, PoolRelease};
