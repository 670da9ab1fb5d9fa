//! Runs claims for every active account
//!
//! Accounts are processed one after another with a fixed pause between
//! them. A failure in one account is logged and recorded in the
//! [`RunSummary`]; the loop always moves on to the next account.
//!
//! Runs for the same account are serialized by an in-process lock and,
//! when configured, an [`AccountLock`] shared with other processes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use hoyosign_common::Clock;
use hoyosign_domain::constants::DEFAULT_ACCOUNT_DELAY_MS;
use hoyosign_domain::{Account, ClaimResult, GameId, Result};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::account::{AccountLock, AccountStore, ClaimResultSink};
use crate::claim::ClaimProtocol;
use crate::schedule::DailyJob;

/// Outcome of one account within a run.
#[derive(Debug, Clone)]
pub struct AccountRun {
    pub account_id: String,
    pub account_name: String,
    /// Per-game results, or the error that kept this account from claiming.
    pub outcome: std::result::Result<Vec<ClaimResult>, String>,
    /// Set when the claims went through but the claim time was not saved.
    pub record_error: Option<String>,
}

impl AccountRun {
    fn failed(account: &Account, reason: String) -> Self {
        Self {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            outcome: Err(reason),
            record_error: None,
        }
    }
}

/// Everything a run did, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub runs: Vec<AccountRun>,
}

impl RunSummary {
    pub fn accounts(&self) -> usize {
        self.runs.len()
    }

    /// Successful game claims across all accounts.
    pub fn claims_succeeded(&self) -> usize {
        self.results().filter(|r| r.success).count()
    }

    pub fn claims_failed(&self) -> usize {
        self.results().filter(|r| !r.success).count()
    }

    /// Accounts that errored before producing results.
    pub fn accounts_failed(&self) -> usize {
        self.runs.iter().filter(|r| r.outcome.is_err()).count()
    }

    fn results(&self) -> impl Iterator<Item = &ClaimResult> {
        self.runs.iter().filter_map(|r| r.outcome.as_ref().ok()).flatten()
    }
}

/// Claims for accounts from an [`AccountStore`] and hands results to a
/// [`ClaimResultSink`].
pub struct RunOrchestrator {
    store: Arc<dyn AccountStore>,
    claims: Arc<ClaimProtocol>,
    sink: Arc<dyn ClaimResultSink>,
    clock: Arc<dyn Clock>,
    account_delay: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
    account_lock: Option<Arc<dyn AccountLock>>,
}

impl RunOrchestrator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        claims: Arc<ClaimProtocol>,
        sink: Arc<dyn ClaimResultSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            claims,
            sink,
            clock,
            account_delay: Duration::from_millis(DEFAULT_ACCOUNT_DELAY_MS),
            locks: DashMap::new(),
            account_lock: None,
        }
    }

    /// Pause between two accounts.
    pub const fn with_account_delay(mut self, delay: Duration) -> Self {
        self.account_delay = delay;
        self
    }

    /// Also hold `lock` while an account runs, for triggers living in other
    /// processes.
    pub fn with_account_lock(mut self, lock: Arc<dyn AccountLock>) -> Self {
        self.account_lock = Some(lock);
        self
    }

    /// Claim for every active account in the store.
    #[instrument(skip(self))]
    pub async fn run_all(&self) -> Result<RunSummary> {
        let accounts = self.store.active().await?;
        info!(accounts = accounts.len(), "Starting claim run");
        let summary = self.run_accounts(accounts, None).await;
        info!(
            accounts = summary.accounts(),
            succeeded = summary.claims_succeeded(),
            failed = summary.claims_failed(),
            "Claim run finished"
        );
        Ok(summary)
    }

    /// Claim for the given accounts in order, pausing between them.
    /// Inactive accounts are skipped.
    ///
    /// `games` replaces each account's enabled games when set.
    pub async fn run_accounts(
        &self,
        accounts: Vec<Account>,
        games: Option<&[GameId]>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for account in accounts.into_iter().filter(|a| a.active) {
            if !summary.runs.is_empty() && !self.account_delay.is_zero() {
                tokio::time::sleep(self.account_delay).await;
            }
            summary.runs.push(self.run_account(&account, games).await);
        }

        summary
    }

    /// Claim for one account: the given games, or its enabled games.
    ///
    /// Holds the account's lock for the whole run, so two triggers for the
    /// same account never claim concurrently. Results are always delivered
    /// once claims were made; a failure to save the claim time is kept in
    /// [`AccountRun::record_error`].
    #[instrument(skip(self, account, games), fields(account_id = %account.id))]
    pub async fn run_account(&self, account: &Account, games: Option<&[GameId]>) -> AccountRun {
        let lock = self.lock_for(&account.id);
        let run = {
            let _guard = lock.lock().await;
            self.run_locked(account, games).await
        };
        drop(lock);
        self.locks.remove_if(&account.id, |_, lock| Arc::strong_count(lock) == 1);
        run
    }

    async fn run_locked(&self, account: &Account, games: Option<&[GameId]>) -> AccountRun {
        let _lease = match &self.account_lock {
            Some(lock) => match lock.acquire(&account.id).await {
                Ok(lease) => Some(lease),
                Err(err) => {
                    error!(error = %err, "Failed to lock account");
                    return AccountRun::failed(account, err.user_message());
                }
            },
            None => None,
        };

        let games = games.unwrap_or(&account.enabled_games);
        let results = self.claims.claim_all(&account.credential, games).await;

        let record_error = match self.store.record_claim(&account.id, self.clock.now_utc()).await {
            Ok(()) => None,
            Err(err) => {
                error!(error = %err, "Failed to record claim time");
                Some(err.user_message())
            }
        };

        if let Err(err) = self.sink.deliver(account, &results).await {
            warn!(error = %err, "Failed to deliver claim results");
        }

        AccountRun {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            outcome: Ok(results),
            record_error,
        }
    }

    fn lock_for(&self, account_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(account_id.to_string()).or_default().clone()
    }

    /// Accounts with an in-process lock entry.
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }
}

#[async_trait]
impl DailyJob for RunOrchestrator {
    fn name(&self) -> &str {
        "daily-claim"
    }

    async fn run(&self) -> Result<()> {
        self.run_all().await.map(|_| ())
    }
}
