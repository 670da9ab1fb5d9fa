//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCOUNT_DELAY_MS, DEFAULT_GAME_DELAY_MS, DEFAULT_QR_MAX_TRANSPORT_FAILURES,
    DEFAULT_QR_POLL_INTERVAL_MS, DEFAULT_SCHEDULE_TIME, DEFAULT_STOP_TIMEOUT_SECS,
    DEFAULT_TICK_INTERVAL_SECS,
};

/// Application configuration
///
/// Every section and field has a default, so a partial file (or none at all)
/// is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: ScheduleConfig,
    pub http: HttpConfig,
    pub pacing: PacingConfig,
    pub storage: StorageConfig,
    pub endpoints: EndpointsConfig,
}

/// Initial schedule settings, used until the store holds its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Local time of day, `HH:MM`.
    pub time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { enabled: false, time: DEFAULT_SCHEDULE_TIME.to_string() }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts for idempotent requests (initial try + retries).
    pub max_attempts: usize,
    pub backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15, max_attempts: 2, backoff_ms: 500 }
    }
}

impl HttpConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Waits between remote calls and scheduler timings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub game_delay_ms: u64,
    pub account_delay_ms: u64,
    pub qr_poll_interval_ms: u64,
    pub qr_max_transport_failures: u32,
    pub tick_interval_secs: u64,
    pub stop_timeout_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            game_delay_ms: DEFAULT_GAME_DELAY_MS,
            account_delay_ms: DEFAULT_ACCOUNT_DELAY_MS,
            qr_poll_interval_ms: DEFAULT_QR_POLL_INTERVAL_MS,
            qr_max_transport_failures: DEFAULT_QR_MAX_TRANSPORT_FAILURES,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl PacingConfig {
    pub const fn game_delay(&self) -> Duration {
        Duration::from_millis(self.game_delay_ms)
    }

    pub const fn account_delay(&self) -> Duration {
        Duration::from_millis(self.account_delay_ms)
    }

    pub const fn qr_poll_interval(&self) -> Duration {
        Duration::from_millis(self.qr_poll_interval_ms)
    }

    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

/// Where accounts, settings and the claim log live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to `~/.hoyosign` when unset.
    pub data_dir: Option<PathBuf>,
}

/// Portal hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub takumi: String,
    pub hk4e_sdk: String,
    pub passport: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            takumi: "https://api-takumi.mihoyo.com".to_string(),
            hk4e_sdk: "https://hk4e-sdk.mihoyo.com".to_string(),
            passport: "https://passport-api.mihoyo.com".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// Points every host at one base URL; used against local mock servers.
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { takumi: base.clone(), hk4e_sdk: base.clone(), passport: base }
    }
}
