//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock wall clocks (re-exported from
//!   testing)
//! - **[`format`]**: human-readable duration formatting

pub mod format;

pub use format::format_duration;

// Re-export Clock abstractions from testing module
pub use crate::testing::time::{Clock, MockClock, SystemClock};
