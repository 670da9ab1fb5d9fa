//! Account registration and maintenance

use std::sync::Arc;

use hoyosign_common::Clock;
use hoyosign_domain::{
    Account, GameId, HoyoSignError, LoginOutcome, Result, ScheduleSettings, SessionCredential,
};
use tracing::{info, instrument};

use super::ports::{AccountChange, AccountStore};
use crate::claim::ClaimProtocol;

/// Account registry operations on top of an [`AccountStore`].
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    claims: Arc<ClaimProtocol>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        claims: Arc<ClaimProtocol>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, claims, clock }
    }

    /// Store the credential of a completed login.
    ///
    /// The account is named after the first role nickname found. An account
    /// with the same id keeps its settings and gets the new credential and
    /// name.
    #[instrument(skip_all, fields(account_id = %outcome.account_id))]
    pub async fn register_login(&self, outcome: &LoginOutcome) -> Result<Account> {
        self.register(outcome.account_id.clone(), outcome.credential.clone()).await
    }

    /// Store a credential captured elsewhere (for example from a browser).
    ///
    /// # Errors
    /// [`HoyoSignError::Validation`] if the credential carries neither
    /// `stuid` nor `account_id`.
    pub async fn import_credential(&self, raw: &str) -> Result<Account> {
        let credential = SessionCredential::parse(raw)?;
        let account_id = credential
            .account_id()
            .map(str::to_string)
            .ok_or_else(|| HoyoSignError::Validation("credential has no stuid or account_id".into()))?;
        self.register(account_id, credential).await
    }

    async fn register(&self, account_id: String, credential: SessionCredential) -> Result<Account> {
        let name = self
            .claims
            .discover_nickname(&credential)
            .await
            .unwrap_or_else(|| Account::fallback_name(&account_id));

        let (new_credential, new_name) = (credential.clone(), name.clone());
        let change: AccountChange = Box::new(move |existing: &mut Account| {
            existing.credential = new_credential;
            existing.name = new_name;
        });

        match self.store.update(&account_id, change).await {
            Ok(existing) => {
                info!(account_id = %existing.id, name = %existing.name, "Updated account credential");
                Ok(existing)
            }
            Err(HoyoSignError::NotFound(_)) => {
                let account = Account::new(account_id, name, credential, self.clock.now_utc());
                self.store.upsert(account.clone()).await?;
                info!(account_id = %account.id, name = %account.name, "Added account");
                Ok(account)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        self.store.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Account> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| HoyoSignError::NotFound(format!("account {id}")))
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<Account> {
        self.store.update(id, Box::new(move |account: &mut Account| account.active = active)).await
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HoyoSignError::Validation("account name must not be empty".into()));
        }
        let name = name.to_string();
        self.store.update(id, Box::new(move |account: &mut Account| account.name = name)).await
    }

    /// Replace the enabled games; order is kept and duplicates dropped.
    ///
    /// # Errors
    /// [`HoyoSignError::Validation`] for an empty list.
    pub async fn set_games(&self, id: &str, games: &[GameId]) -> Result<Account> {
        if games.is_empty() {
            return Err(HoyoSignError::Validation("at least one game must be enabled".into()));
        }
        let mut enabled = Vec::with_capacity(games.len());
        for game in games {
            if !enabled.contains(game) {
                enabled.push(*game);
            }
        }
        self.store
            .update(id, Box::new(move |account: &mut Account| account.enabled_games = enabled))
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        if self.store.remove(id).await? {
            info!(account_id = %id, "Removed account");
            Ok(())
        } else {
            Err(HoyoSignError::NotFound(format!("account {id}")))
        }
    }

    /// Stored schedule settings, or `fallback` when none were saved yet.
    pub async fn schedule_settings(&self, fallback: ScheduleSettings) -> Result<ScheduleSettings> {
        Ok(self.store.schedule_settings().await?.unwrap_or(fallback))
    }

    pub async fn save_schedule_settings(&self, settings: ScheduleSettings) -> Result<()> {
        self.store.save_schedule_settings(settings).await
    }
}
