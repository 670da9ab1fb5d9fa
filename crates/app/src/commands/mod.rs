//! CLI command handlers.

pub mod accounts;
pub mod autostart;
pub mod claim;
pub mod daemon;
pub mod login;
pub mod logs;
pub mod schedule;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use hoyosign_common::{format_duration, Clock, SystemClock};
use hoyosign_core::{AccountService, ClaimProtocol, CredentialExchange, RunOrchestrator};
use hoyosign_core::AccountRun;
use hoyosign_domain::{ClaimResult, Config, ScheduleSettings, ScheduleTime};
use hoyosign_infra::mihoyo::TransportClient;
use hoyosign_infra::storage::default_data_dir;
use hoyosign_infra::{
    FileAccountLock, HttpClaimGateway, HttpClient, HttpPassportGateway, JsonAccountStore,
    JsonClaimLog,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared context for all commands: configuration plus the wired services.
pub struct Context {
    pub config: Config,
    pub json_output: bool,
    pub clock: Arc<dyn Clock>,
    pub claim_log: Arc<JsonClaimLog>,
    pub accounts: AccountService,
    pub orchestrator: Arc<RunOrchestrator>,
    pub exchange: CredentialExchange,
}

impl Context {
    /// Build the services described by `config`.
    pub fn from_config(config: Config, json_output: bool) -> Result<Self> {
        let data_dir = config.storage.data_dir.clone().unwrap_or_else(default_data_dir);
        debug!(data_dir = %data_dir.display(), "Using data directory");

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let http = HttpClient::from_config(&config.http).context("building HTTP client")?;
        let transport = Arc::new(TransportClient::new(http, config.endpoints.clone()));

        let store = Arc::new(JsonAccountStore::new(&data_dir));
        let claim_log = Arc::new(JsonClaimLog::new(&data_dir, clock.clone()));

        let claims = Arc::new(
            ClaimProtocol::new(Arc::new(HttpClaimGateway::new(transport.clone())))
                .with_game_delay(config.pacing.game_delay()),
        );
        let accounts = AccountService::new(store.clone(), claims.clone(), clock.clone());
        let orchestrator = Arc::new(
            RunOrchestrator::new(store, claims, claim_log.clone(), clock.clone())
                .with_account_delay(config.pacing.account_delay())
                .with_account_lock(Arc::new(FileAccountLock::new(&data_dir))),
        );
        let exchange = CredentialExchange::new(Arc::new(HttpPassportGateway::new(transport)))
            .with_poll_interval(config.pacing.qr_poll_interval())
            .with_max_transport_failures(config.pacing.qr_max_transport_failures);

        Ok(Self { config, json_output, clock, claim_log, accounts, orchestrator, exchange })
    }

    /// Persisted schedule settings, falling back to the configured ones.
    pub async fn schedule_settings(&self) -> Result<ScheduleSettings> {
        let time: ScheduleTime = self.config.schedule.time.parse()?;
        let fallback = ScheduleSettings { enabled: self.config.schedule.enabled, time };
        Ok(self.accounts.schedule_settings(fallback).await?)
    }
}

/// Token cancelled on the first Ctrl-C.
pub fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    token
}

/// `2024-05-06 08:00 (in 3h 5m)`
pub fn format_next_run(next: NaiveDateTime, now: NaiveDateTime) -> String {
    let wait = (next - now).to_std().unwrap_or_default();
    format!("{} (in {})", next.format("%Y-%m-%d %H:%M"), format_duration(wait))
}

pub fn format_local(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Account header, its results and a warning when the claim time was not
/// saved.
pub fn print_run(run: &AccountRun) {
    println!("{} ({})", run.account_name, run.account_id);
    match &run.outcome {
        Ok(results) => print_results(results),
        Err(reason) => println!("  ✗ {reason}"),
    }
    if let Some(reason) = &run.record_error {
        println!("  warning: claim time not saved ({reason})");
    }
}

/// One line per result: `✓ 原神 (uid 100): claimed: got ... x2`.
pub fn print_results(results: &[ClaimResult]) {
    for result in results {
        let mark = if result.success { "✓" } else { "✗" };
        let role = result
            .role
            .as_ref()
            .map(|r| format!(" (uid {})", r.uid))
            .unwrap_or_default();
        println!("  {mark} {}{role}: {}", result.game.descriptor().name, result.message);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn next_run_shows_time_and_wait() {
        assert_eq!(format_next_run(at(6, 8, 0), at(6, 4, 55)), "2024-05-06 08:00 (in 3h 5m)");
        assert_eq!(format_next_run(at(7, 8, 0), at(6, 8, 0)), "2024-05-07 08:00 (in 1d 0h)");
    }
}
