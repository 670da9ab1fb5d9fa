//! Account registry, schedule settings and delivery ports

pub mod ports;
pub mod service;

pub use ports::{
    AccountChange, AccountLease, AccountLock, AccountStore, AutostartRegistrar, ClaimResultSink,
};
pub use service::AccountService;
