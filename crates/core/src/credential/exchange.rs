//! QR login state machine and token exchange chain
//!
//! ```text
//! request_qr ──► poll ──► Confirmed(uid, game_token)
//!                  │            │
//!                  ├─► Expired  ▼
//!                  ├─► Failed   exchange_session_token ──► (mid, stoken)
//!                  └─► Cancelled        │
//!                                       ├─► cookie token (optional)
//!                                       └─► long token   (optional)
//!                                                 │
//!                                                 ▼
//!                                       SessionCredential
//! ```

use std::sync::Arc;
use std::time::Duration;

use hoyosign_domain::constants::{
    DEFAULT_QR_MAX_TRANSPORT_FAILURES, DEFAULT_QR_POLL_INTERVAL_MS, QR_RETRYABLE_RETCODES,
};
use hoyosign_domain::{
    DeviceIdentity, HoyoSignError, LoginOutcome, LoginProgress, QrPollOutcome, QrSession,
    QrState, Result, SessionCredential, SessionTokens, StageOutcome, TokenChain,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ports::PassportGateway;
use crate::signing::new_device_identity;

/// Receives login progress. Called inline from the poll loop, so
/// implementations must return quickly.
pub trait LoginStatusSink: Send + Sync {
    fn on_progress(&self, progress: &LoginProgress);
}

impl<F> LoginStatusSink for F
where
    F: Fn(&LoginProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &LoginProgress) {
        self(progress);
    }
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreProgress;

impl LoginStatusSink for IgnoreProgress {
    fn on_progress(&self, _progress: &LoginProgress) {}
}

/// Drives a QR login from ticket to credential.
pub struct CredentialExchange {
    gateway: Arc<dyn PassportGateway>,
    poll_interval: Duration,
    max_transport_failures: u32,
}

impl CredentialExchange {
    pub fn new(gateway: Arc<dyn PassportGateway>) -> Self {
        Self {
            gateway,
            poll_interval: Duration::from_millis(DEFAULT_QR_POLL_INTERVAL_MS),
            max_transport_failures: DEFAULT_QR_MAX_TRANSPORT_FAILURES,
        }
    }

    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Consecutive transport failures tolerated while polling.
    pub const fn with_max_transport_failures(mut self, limit: u32) -> Self {
        self.max_transport_failures = limit;
        self
    }

    /// Request a QR code under a fresh device identity.
    ///
    /// # Errors
    /// Gateway failures become [`HoyoSignError::Login`] ("qr unavailable");
    /// a URL without a `ticket` parameter is a [`HoyoSignError::Protocol`].
    #[instrument(skip(self))]
    pub async fn request_qr(&self) -> Result<QrSession> {
        let device = new_device_identity();
        let url = self.gateway.fetch_qr(&device).await.map_err(|err| {
            warn!(error = %err, "QR code request failed");
            HoyoSignError::Login(format!("qr unavailable: {}", err.user_message()))
        })?;
        let ticket = extract_ticket(&url)
            .ok_or_else(|| HoyoSignError::Protocol("qr url carries no ticket".to_string()))?;

        debug!(ticket_len = ticket.len(), "QR code issued");
        Ok(QrSession { url, ticket, device })
    }

    /// Poll the ticket until it reaches a terminal state or `cancel` fires.
    ///
    /// Each cycle waits `poll_interval` and then queries once. Progress is
    /// reported on every state transition.
    #[instrument(skip_all)]
    pub async fn poll(
        &self,
        session: &QrSession,
        sink: &dyn LoginStatusSink,
        cancel: &CancellationToken,
    ) -> QrPollOutcome {
        let mut last_state: Option<QrState> = None;
        let mut transport_failures = 0u32;

        loop {
            if cancel.is_cancelled() {
                return QrPollOutcome::Cancelled;
            }
            tokio::select! {
                () = cancel.cancelled() => return QrPollOutcome::Cancelled,
                () = tokio::time::sleep(self.poll_interval) => {}
            }

            let status = match self.gateway.query_qr(&session.device, &session.ticket).await {
                Ok(status) => {
                    transport_failures = 0;
                    status
                }
                Err(err) if err.retcode().is_some_and(|c| QR_RETRYABLE_RETCODES.contains(&c)) => {
                    debug!(retcode = ?err.retcode(), "QR query throttled; polling again");
                    continue;
                }
                Err(HoyoSignError::Transport(detail)) => {
                    transport_failures += 1;
                    warn!(attempt = transport_failures, error = %detail, "QR query failed");
                    if transport_failures > self.max_transport_failures {
                        let reason = format!("network error: {detail}");
                        sink.on_progress(&LoginProgress::Failed(reason.clone()));
                        return QrPollOutcome::Failed(reason);
                    }
                    continue;
                }
                Err(err) => {
                    warn!(error = %err, "QR query rejected");
                    let reason = err.user_message();
                    sink.on_progress(&LoginProgress::Failed(reason.clone()));
                    return QrPollOutcome::Failed(reason);
                }
            };

            let changed = last_state != Some(status.state);
            last_state = Some(status.state);

            match status.state {
                QrState::Init => {
                    if changed {
                        sink.on_progress(&LoginProgress::WaitingForScan);
                    }
                }
                QrState::Scanned => {
                    if changed {
                        sink.on_progress(&LoginProgress::Scanned);
                    }
                }
                QrState::Confirmed => {
                    return match parse_confirmation(status.raw_payload.as_deref()) {
                        Some((account_id, game_token)) => {
                            info!(account_id = %account_id, "QR login confirmed");
                            sink.on_progress(&LoginProgress::Confirmed);
                            QrPollOutcome::Confirmed { account_id, game_token }
                        }
                        None => {
                            warn!("QR confirmation payload unreadable");
                            let reason = "unreadable confirmation payload".to_string();
                            sink.on_progress(&LoginProgress::Failed(reason.clone()));
                            QrPollOutcome::Failed(reason)
                        }
                    };
                }
                QrState::Expired => {
                    sink.on_progress(&LoginProgress::Expired);
                    return QrPollOutcome::Expired;
                }
                QrState::Failed => {
                    let reason = "login rejected".to_string();
                    sink.on_progress(&LoginProgress::Failed(reason.clone()));
                    return QrPollOutcome::Failed(reason);
                }
            }
        }
    }

    /// Trade the confirmed game token for `(mid, stoken)`.
    ///
    /// # Errors
    /// Any failure here aborts the chain: gateway errors propagate, and a
    /// non-numeric account id or an empty token is a
    /// [`HoyoSignError::Protocol`].
    #[instrument(skip(self, device, game_token))]
    pub async fn exchange_session_token(
        &self,
        device: &DeviceIdentity,
        account_id: &str,
        game_token: &str,
    ) -> Result<SessionTokens> {
        let numeric_id: u64 = account_id.trim().parse().map_err(|_| {
            HoyoSignError::Protocol(format!("account id is not numeric: {account_id}"))
        })?;

        let grant = self.gateway.session_by_game_token(device, numeric_id, game_token).await?;
        if grant.mid.is_empty() || grant.stoken.is_empty() {
            return Err(HoyoSignError::Protocol("session grant missing mid or stoken".into()));
        }

        Ok(SessionTokens { account_id: account_id.trim().to_string(), mid: grant.mid, stoken: grant.stoken })
    }

    /// Optional stage; a failure is recorded, never raised.
    pub async fn exchange_cookie_token(&self, session: &SessionTokens) -> StageOutcome<String> {
        let outcome = non_empty(self.gateway.cookie_token(session).await, "cookie token");
        if let StageOutcome::Failed(reason) = &outcome {
            warn!(reason = %reason, "cookie token exchange failed; continuing without it");
        }
        outcome
    }

    /// Optional stage; a failure is recorded, never raised.
    pub async fn exchange_long_token(&self, session: &SessionTokens) -> StageOutcome<String> {
        let outcome = non_empty(self.gateway.long_token(session).await, "long token");
        if let StageOutcome::Failed(reason) = &outcome {
            warn!(reason = %reason, "long token exchange failed; continuing without it");
        }
        outcome
    }

    pub fn build_session_credential(chain: &TokenChain) -> SessionCredential {
        SessionCredential::from_chain(chain)
    }

    /// Run the whole login for an issued QR session.
    ///
    /// # Errors
    /// - [`HoyoSignError::Cancelled`] when `cancel` fires while polling
    /// - [`HoyoSignError::Login`] when the code expires or the portal rejects it
    /// - whatever the session-token exchange returned
    ///
    /// No credential is produced unless the mandatory stages succeed.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        session: &QrSession,
        sink: &dyn LoginStatusSink,
        cancel: &CancellationToken,
    ) -> Result<LoginOutcome> {
        let (account_id, game_token) = match self.poll(session, sink, cancel).await {
            QrPollOutcome::Confirmed { account_id, game_token } => (account_id, game_token),
            QrPollOutcome::Expired => return Err(HoyoSignError::Login("qr code expired".into())),
            QrPollOutcome::Failed(reason) => return Err(HoyoSignError::Login(reason)),
            QrPollOutcome::Cancelled => {
                return Err(HoyoSignError::Cancelled("login cancelled".into()))
            }
        };

        sink.on_progress(&LoginProgress::ExchangingTokens);
        let tokens = match self
            .exchange_session_token(&session.device, &account_id, &game_token)
            .await
        {
            Ok(tokens) => tokens,
            Err(err) => {
                sink.on_progress(&LoginProgress::Failed(err.user_message()));
                return Err(err);
            }
        };

        let cookie_token = self.exchange_cookie_token(&tokens).await;
        let long_token = self.exchange_long_token(&tokens).await;

        let chain = TokenChain { session: tokens, cookie_token, long_token };
        let credential = Self::build_session_credential(&chain);

        info!(
            account_id = %chain.session.account_id,
            cookie_token = chain.cookie_token.is_ok(),
            long_token = chain.long_token.is_ok(),
            "Login completed"
        );

        Ok(LoginOutcome {
            account_id: chain.session.account_id,
            credential,
            cookie_token: chain.cookie_token.map(|_| ()),
            long_token: chain.long_token.map(|_| ()),
        })
    }
}

/// Value of the `ticket` query parameter in a QR URL.
pub fn extract_ticket(url: &str) -> Option<String> {
    let start = url.find("ticket=")? + "ticket=".len();
    let rest = &url[start..];
    let ticket = rest.split('&').next().unwrap_or_default();
    (!ticket.is_empty()).then(|| ticket.to_string())
}

/// `(uid, token)` from the confirmation payload.
fn parse_confirmation(raw: Option<&str>) -> Option<(String, String)> {
    let value: Value = serde_json::from_str(raw?).ok()?;
    let uid = match value.get("uid")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let token = value.get("token")?.as_str()?.to_string();
    (!uid.is_empty() && !token.is_empty()).then_some((uid, token))
}

fn non_empty(result: Result<String>, what: &str) -> StageOutcome<String> {
    match result {
        Ok(token) if token.is_empty() => StageOutcome::Failed(format!("empty {what}")),
        other => other.into(),
    }
}
