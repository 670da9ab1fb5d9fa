//! Testing utilities and helpers
//!
//! - **[`time`]**: wall-clock abstraction with a controllable mock
//! - **[`async_utils`]**: async wait helpers (`runtime` feature)

#[cfg(any(feature = "runtime", test))]
pub mod async_utils;
pub mod time;

#[cfg(feature = "runtime")]
pub use async_utils::poll_until;
pub use time::{Clock, MockClock, SystemClock};
