//! # hoyosign Core
//!
//! Check-in workflows - no infrastructure dependencies.
//!
//! This crate contains:
//! - Request signing
//! - The QR login state machine and token exchange chain
//! - The per-game claim protocol
//! - The schedule gate and the multi-account run orchestrator
//! - Port interfaces (traits) for HTTP gateways, storage and delivery
//!
//! ## Architecture Principles
//! - Only depends on `hoyosign-common` and `hoyosign-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits

pub mod account;
pub mod claim;
pub mod credential;
pub mod orchestrator;
pub mod schedule;
pub mod signing;

// Re-export specific items to avoid ambiguity
pub use account::{
    AccountChange, AccountLease, AccountLock, AccountService, AccountStore, AutostartRegistrar,
    ClaimResultSink,
};
pub use claim::{ClaimGateway, ClaimProtocol};
pub use credential::{
    CredentialExchange, IgnoreProgress, LoginStatusSink, PassportGateway, QrStatus, SessionGrant,
};
pub use orchestrator::{AccountRun, RunOrchestrator, RunSummary};
pub use schedule::{DailyJob, ScheduleGate};
pub use signing::{DynamicSecret, SaltKind};
