//! Port interfaces for persisted accounts and claim results

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hoyosign_domain::{Account, ClaimResult, Result, ScheduleSettings};

/// Account and schedule-settings persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// All accounts in insertion order.
    async fn list(&self) -> Result<Vec<Account>>;

    /// Accounts the orchestrator should claim for.
    async fn active(&self) -> Result<Vec<Account>> {
        Ok(self.list().await?.into_iter().filter(|a| a.active).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Account>>;

    /// Insert, or replace the account with the same id in place.
    async fn upsert(&self, account: Account) -> Result<()>;

    /// Read the stored account, apply `change` and write it back in one step.
    ///
    /// # Errors
    /// [`hoyosign_domain::HoyoSignError::NotFound`] if the account is gone.
    async fn update(&self, id: &str, change: AccountChange) -> Result<Account>;

    /// Returns `false` when no account had this id.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Set `last_claim_at` for one account.
    ///
    /// # Errors
    /// [`hoyosign_domain::HoyoSignError::NotFound`] if the account is gone.
    async fn record_claim(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// `None` until settings were saved once.
    async fn schedule_settings(&self) -> Result<Option<ScheduleSettings>>;

    async fn save_schedule_settings(&self, settings: ScheduleSettings) -> Result<()>;
}

/// Change applied to one stored account.
pub type AccountChange = Box<dyn FnOnce(&mut Account) + Send>;

/// Exclusive claim rights for one account, shared by every process using
/// the same data.
#[async_trait]
pub trait AccountLock: Send + Sync {
    /// Waits until no other holder runs `account_id`. Released when the
    /// returned lease drops.
    async fn acquire(&self, account_id: &str) -> Result<AccountLease>;
}

/// Held for as long as the account is locked.
pub type AccountLease = Box<dyn Send + Sync>;

/// Receives the results of one account's run.
#[async_trait]
pub trait ClaimResultSink: Send + Sync {
    async fn deliver(&self, account: &Account, results: &[ClaimResult]) -> Result<()>;
}

/// Start-at-login registration for the current user.
pub trait AutostartRegistrar: Send + Sync {
    fn is_enabled(&self) -> Result<bool>;

    fn enable(&self) -> Result<()>;

    fn disable(&self) -> Result<()>;
}
