//! Account and schedule-settings store backed by two JSON files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hoyosign_core::{AccountChange, AccountStore};
use hoyosign_domain::{Account, HoyoSignError, Result, ScheduleSettings};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

use super::{read_json, write_json_atomic, FileLock};

pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const STORE_LOCK_FILE: &str = "accounts.lock";

/// [`AccountStore`] persisting to `accounts.json` (an array, insertion
/// order) and `settings.json`.
///
/// Every write reads the file, applies its change and writes it back while
/// holding the async lock and the `accounts.lock` file lock, so updates from
/// this process and from other `hoyosign` processes do not overwrite each
/// other.
pub struct JsonAccountStore {
    accounts_path: PathBuf,
    settings_path: PathBuf,
    lock_path: PathBuf,
    lock: Mutex<()>,
}

impl JsonAccountStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            accounts_path: dir.join(ACCOUNTS_FILE),
            settings_path: dir.join(SETTINGS_FILE),
            lock_path: dir.join(STORE_LOCK_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn accounts_path(&self) -> &Path {
        &self.accounts_path
    }

    /// Both locks, in-process first.
    async fn exclusive(&self) -> Result<(MutexGuard<'_, ()>, FileLock)> {
        let guard = self.lock.lock().await;
        let file = FileLock::acquire(&self.lock_path).await?;
        Ok((guard, file))
    }

    async fn load_accounts(&self) -> Result<Vec<Account>> {
        Ok(read_json(&self.accounts_path).await?.unwrap_or_default())
    }

    async fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        write_json_atomic(&self.accounts_path, accounts).await?;
        debug!(count = accounts.len(), "Saved accounts");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for JsonAccountStore {
    async fn list(&self) -> Result<Vec<Account>> {
        let _guard = self.lock.lock().await;
        self.load_accounts().await
    }

    async fn get(&self, id: &str) -> Result<Option<Account>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_accounts().await?.into_iter().find(|a| a.id == id))
    }

    #[instrument(skip_all, fields(account_id = %account.id))]
    async fn upsert(&self, account: Account) -> Result<()> {
        let _locks = self.exclusive().await?;
        let mut accounts = self.load_accounts().await?;
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
        self.save_accounts(&accounts).await
    }

    #[instrument(skip(self, change))]
    async fn update(&self, id: &str, change: AccountChange) -> Result<Account> {
        let _locks = self.exclusive().await?;
        let mut accounts = self.load_accounts().await?;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| HoyoSignError::NotFound(format!("account {id}")))?;
        change(account);
        let updated = account.clone();
        self.save_accounts(&accounts).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &str) -> Result<bool> {
        let _locks = self.exclusive().await?;
        let mut accounts = self.load_accounts().await?;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        if accounts.len() == before {
            return Ok(false);
        }
        self.save_accounts(&accounts).await?;
        Ok(true)
    }

    async fn record_claim(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let _locks = self.exclusive().await?;
        let mut accounts = self.load_accounts().await?;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| HoyoSignError::NotFound(format!("account {id}")))?;
        account.last_claim_at = Some(at);
        self.save_accounts(&accounts).await
    }

    async fn schedule_settings(&self) -> Result<Option<ScheduleSettings>> {
        let _guard = self.lock.lock().await;
        read_json(&self.settings_path).await
    }

    async fn save_schedule_settings(&self, settings: ScheduleSettings) -> Result<()> {
        let _locks = self.exclusive().await?;
        write_json_atomic(&self.settings_path, &settings).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use hoyosign_domain::{GameId, ScheduleTime, SessionCredential};

    use super::*;

    fn account(id: &str) -> Account {
        Account::new(
            id,
            format!("name {id}"),
            SessionCredential::parse(format!("stuid={id}; stoken=st")).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn empty_directory_has_no_accounts_or_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());

        assert!(store.list().await.unwrap().is_empty());
        assert!(store.schedule_settings().await.unwrap().is_none());
        assert!(!store.remove("1").await.unwrap());
    }

    /// Validates upsert ordering and replacement.
    ///
    /// Assertions:
    /// - New accounts append in insertion order
    /// - Replacing an account keeps its position
    /// - A fresh store instance sees the persisted data
    #[tokio::test]
    async fn upsert_keeps_insertion_order_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());

        store.upsert(account("1")).await.unwrap();
        store.upsert(account("2")).await.unwrap();
        let mut changed = account("1");
        changed.enabled_games = vec![GameId::Zzz];
        store.upsert(changed).await.unwrap();

        let reopened = JsonAccountStore::new(dir.path());
        let accounts = reopened.list().await.unwrap();
        assert_eq!(accounts.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(accounts[0].enabled_games, vec![GameId::Zzz]);
    }

    #[tokio::test]
    async fn record_claim_sets_timestamp_or_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());
        store.upsert(account("1")).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();

        store.record_claim("1", at).await.unwrap();
        assert_eq!(store.get("1").await.unwrap().unwrap().last_claim_at, Some(at));
        assert!(matches!(store.record_claim("9", at).await, Err(HoyoSignError::NotFound(_))));
    }

    #[tokio::test]
    async fn active_filters_paused_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());
        let mut paused = account("2");
        paused.active = false;
        store.upsert(account("1")).await.unwrap();
        store.upsert(paused).await.unwrap();

        let active = store.active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "1");
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());
        let settings = ScheduleSettings { enabled: true, time: ScheduleTime::new(21, 5).unwrap() };

        store.save_schedule_settings(settings).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(raw.contains("\"21:05\""));
        assert_eq!(store.schedule_settings().await.unwrap(), Some(settings));
    }

    #[tokio::test]
    async fn concurrent_record_claims_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonAccountStore::new(dir.path()));
        for id in ["1", "2", "3", "4"] {
            store.upsert(account(id)).await.unwrap();
        }
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();

        let tasks: Vec<_> = ["1", "2", "3", "4"]
            .into_iter()
            .map(|id| {
                let store = store.clone();
                tokio::spawn(async move { store.record_claim(id, at).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let accounts = store.list().await.unwrap();
        assert!(accounts.iter().all(|a| a.last_claim_at == Some(at)));
    }

    #[tokio::test]
    async fn update_applies_change_or_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path());
        store.upsert(account("1")).await.unwrap();

        let updated = store.update("1", Box::new(|a: &mut Account| a.active = false)).await.unwrap();

        assert!(!updated.active);
        assert!(!store.get("1").await.unwrap().unwrap().active);
        assert!(matches!(
            store.update("9", Box::new(|a: &mut Account| a.active = false)).await,
            Err(HoyoSignError::NotFound(_))
        ));
    }

    /// Validates writes from two store instances over one data directory,
    /// as the daemon and a one-shot command have.
    ///
    /// Assertions:
    /// - Claim times recorded by one instance survive the other's updates
    /// - Every update from the other instance survives as well
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn separate_instances_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let ids: Vec<String> = (1..=8).map(|i| i.to_string()).collect();
        let daemon = Arc::new(JsonAccountStore::new(dir.path()));
        let command = Arc::new(JsonAccountStore::new(dir.path()));
        for id in &ids {
            daemon.upsert(account(id)).await.unwrap();
        }
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();

        let mut tasks = Vec::new();
        for id in ids.clone() {
            let daemon = daemon.clone();
            let command = command.clone();
            let other = id.clone();
            tasks.push(tokio::spawn(async move { daemon.record_claim(&id, at).await }));
            tasks.push(tokio::spawn(async move {
                command
                    .update(&other, Box::new(|a: &mut Account| a.active = false))
                    .await
                    .map(|_| ())
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let accounts = JsonAccountStore::new(dir.path()).list().await.unwrap();
        assert_eq!(accounts.len(), ids.len());
        assert!(accounts.iter().all(|a| a.last_claim_at == Some(at) && !a.active));
    }
}
