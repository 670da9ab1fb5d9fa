//! # hoyosign Domain
//!
//! Business domain types and models for hoyosign.
//!
//! This crate contains:
//! - The static game table and per-game descriptors
//! - Account, credential, claim and login state types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Wire constants (salts, header values, endpoint paths)
//!
//! ## Architecture
//! - No dependencies on other hoyosign crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
