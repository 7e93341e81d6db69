//! # ghostkit Domain
//!
//! Types and models for the Ghost Admin API client.
//!
//! This crate contains:
//! - The error taxonomy ([`GhostError`]) shared by every operation
//! - Client configuration structures
//! - Post, webhook and statistics types
//! - Admin API paths and token constants
//!
//! ## Architecture
//! - No dependencies on other ghostkit crates
//! - No I/O; everything here is pure data and conversion

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::mobiledoc::to_mobiledoc;
