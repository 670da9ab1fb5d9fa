//! # hoyosign Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP client and the miHoYo transport (header families, envelopes)
//! - Passport and check-in gateways
//! - JSON file storage for accounts, settings and the claim log
//! - Configuration loading
//! - The schedule loop
//! - Platform-specific code (XDG autostart)
//!
//! ## Architecture
//! - Implements traits defined in `hoyosign-core`
//! - Depends on `hoyosign-common`, `hoyosign-domain` and `hoyosign-core`
//! - Contains all "impure" code (I/O, network, platform APIs)

pub mod config;
pub mod errors;
pub mod http;
pub mod mihoyo;
pub mod platform;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::HttpClient;
pub use mihoyo::{HttpClaimGateway, HttpPassportGateway, TransportClient};
pub use platform::autostart_registrar;
pub use scheduling::{ScheduleEngine, ScheduleEngineConfig, SchedulerError};
pub use storage::{
    default_data_dir, FileAccountLock, FileLock, JsonAccountStore, JsonClaimLog, LogQuery,
};
