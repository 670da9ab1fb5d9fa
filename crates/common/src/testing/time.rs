//! Time abstraction for testability
//!
//! Provides a trait-based approach to wall-clock reads so that schedule
//! decisions ("is it 08:00 yet, have we run today") can be tested without
//! waiting for real time to pass.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//!
//! use hoyosign_common::testing::{Clock, MockClock};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(7, 59, 0).unwrap();
//! let clock = MockClock::at(start);
//! clock.advance(Duration::minutes(1));
//! assert_eq!(clock.now_local().format("%H:%M").to_string(), "08:00");
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Trait for wall-clock reads
pub trait Clock: Send + Sync {
    /// Current instant in UTC; used for persisted timestamps.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current local wall time; used for schedule decisions.
    fn now_local(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }
}

/// Real system clock implementation
///
/// Reads the operating system clock and local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Mock clock for deterministic testing
///
/// Holds a local wall time that only moves when told to. The UTC view treats
/// the mock's local time as UTC. Clones share the same time.
#[derive(Debug, Clone)]
pub struct MockClock {
    local: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Create a mock clock frozen at `local`.
    pub fn at(local: NaiveDateTime) -> Self {
        Self { local: Arc::new(Mutex::new(local)) }
    }

    /// Move the clock forward (or backward for a negative duration).
    pub fn advance(&self, by: Duration) {
        // Test utility: panic on poisoned mutex to fail tests early
        let mut local = self.local.lock().expect("mutex poisoned");
        *local += by;
    }

    /// Jump to an absolute local time.
    pub fn set(&self, local: NaiveDateTime) {
        // Test utility: panic on poisoned mutex to fail tests early
        *self.local.lock().expect("mutex poisoned") = local;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::at(NaiveDateTime::default())
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.now_local())
    }

    fn now_local(&self) -> NaiveDateTime {
        // Test utility: panic on poisoned mutex to fail tests early
        *self.local.lock().expect("mutex poisoned")
    }
}
