//! Port interfaces for the passport (login) API
//!
//! Implementations perform the HTTP calls and envelope decoding. A non-zero
//! `retcode` must surface as [`HoyoSignError::Application`] so callers can
//! tell "not yet" codes apart from real rejections.
//!
//! [`HoyoSignError::Application`]: hoyosign_domain::HoyoSignError::Application

use async_trait::async_trait;
use hoyosign_domain::{DeviceIdentity, QrState, Result, SessionTokens};

/// Decoded answer of a QR query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrStatus {
    pub state: QrState,
    /// `data.payload.raw` as sent by the portal; only meaningful once
    /// confirmed. Holds a JSON document with `uid` and `token`.
    pub raw_payload: Option<String>,
}

/// `mid` and `stoken` returned for a game token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub mid: String,
    pub stoken: String,
}

impl std::fmt::Debug for SessionGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGrant").field("mid", &self.mid).finish_non_exhaustive()
    }
}

/// Login endpoints
#[async_trait]
pub trait PassportGateway: Send + Sync {
    /// Request a new QR code; returns the URL to render.
    async fn fetch_qr(&self, device: &DeviceIdentity) -> Result<String>;

    /// Ask for the state of a QR ticket.
    async fn query_qr(&self, device: &DeviceIdentity, ticket: &str) -> Result<QrStatus>;

    /// Trade a confirmed game token for a session token.
    async fn session_by_game_token(
        &self,
        device: &DeviceIdentity,
        account_id: u64,
        game_token: &str,
    ) -> Result<SessionGrant>;

    /// Cookie token for web claims.
    async fn cookie_token(&self, session: &SessionTokens) -> Result<String>;

    /// Long-lived login token.
    async fn long_token(&self, session: &SessionTokens) -> Result<String>;
}
