//! In-memory account store, recording result sink and shared account lock

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hoyosign_core::{AccountChange, AccountLease, AccountLock, AccountStore, ClaimResultSink};
use hoyosign_domain::{Account, ClaimResult, HoyoSignError, Result, ScheduleSettings};
use parking_lot::Mutex;

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    settings: Mutex<Option<ScheduleSettings>>,
}

impl MemoryAccountStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self { accounts: Mutex::new(accounts), ..Self::default() }
    }

    pub fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.lock().clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.accounts.lock().iter().find(|a| a.id == id).cloned())
    }

    async fn upsert(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.lock();
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
        Ok(())
    }

    async fn update(&self, id: &str, change: AccountChange) -> Result<Account> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| HoyoSignError::NotFound(format!("account {id}")))?;
        change(account);
        Ok(account.clone())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut accounts = self.accounts.lock();
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() != before)
    }

    async fn record_claim(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| HoyoSignError::NotFound(format!("account {id}")))?;
        account.last_claim_at = Some(at);
        Ok(())
    }

    async fn schedule_settings(&self) -> Result<Option<ScheduleSettings>> {
        Ok(*self.settings.lock())
    }

    async fn save_schedule_settings(&self, settings: ScheduleSettings) -> Result<()> {
        *self.settings.lock() = Some(settings);
        Ok(())
    }
}

/// Sink keeping every delivery as `(account id, results)`.
#[derive(Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<(String, Vec<ClaimResult>)>>,
}

impl RecordingSink {
    pub fn deliveries(&self) -> Vec<(String, Vec<ClaimResult>)> {
        self.deliveries.lock().clone()
    }
}

#[async_trait]
impl ClaimResultSink for RecordingSink {
    async fn deliver(&self, account: &Account, results: &[ClaimResult]) -> Result<()> {
        self.deliveries.lock().push((account.id.clone(), results.to_vec()));
        Ok(())
    }
}

/// Account lock shared by several orchestrators, the way one lock
/// directory is shared by several processes.
#[derive(Default)]
pub struct SharedAccountLock {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    acquired: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl SharedAccountLock {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountLock for SharedAccountLock {
    async fn acquire(&self, account_id: &str) -> Result<AccountLease> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(HoyoSignError::Storage("lock directory unavailable".into()));
        }
        let lock = self.locks.lock().entry(account_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(guard))
    }
}
