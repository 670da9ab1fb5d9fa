//! Modular common utilities shared across hoyosign crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - default: wall-clock abstraction and duration formatting
//! - `runtime`: tokio based async helpers
//! - `test-utils`: helpers for tests in downstream crates

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod testing;
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use time::{format_duration, Clock, MockClock, SystemClock};
