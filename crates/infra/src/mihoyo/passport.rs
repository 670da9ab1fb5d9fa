//! Passport (login) gateway over HTTP

use std::sync::Arc;

use async_trait::async_trait;
use hoyosign_core::{PassportGateway, QrStatus, SessionGrant};
use hoyosign_domain::constants::{
    PATH_COOKIE_TOKEN_BY_STOKEN, PATH_LTOKEN_BY_STOKEN, PATH_QR_FETCH, PATH_QR_QUERY,
    PATH_STOKEN_BY_GAME_TOKEN, QR_APP_ID,
};
use hoyosign_domain::{DeviceIdentity, HoyoSignError, QrState, Result, SessionTokens};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::transport::{HeaderFamily, Host, TransportClient};

#[derive(Debug, Deserialize)]
struct QrFetchData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct QrQueryData {
    stat: String,
    #[serde(default)]
    payload: Option<QrPayload>,
}

#[derive(Debug, Deserialize)]
struct QrPayload {
    #[serde(default)]
    raw: Option<String>,
}

#[derive(Deserialize)]
struct SessionData {
    user_info: UserInfo,
    token: TokenValue,
}

#[derive(Deserialize)]
struct UserInfo {
    mid: String,
}

#[derive(Deserialize)]
struct TokenValue {
    token: String,
}

#[derive(Deserialize)]
struct CookieTokenData {
    cookie_token: String,
}

#[derive(Deserialize)]
struct LongTokenData {
    ltoken: String,
}

/// [`PassportGateway`] backed by the portal's login endpoints.
pub struct HttpPassportGateway {
    transport: Arc<TransportClient>,
}

impl HttpPassportGateway {
    pub fn new(transport: Arc<TransportClient>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl PassportGateway for HttpPassportGateway {
    #[instrument(skip_all)]
    async fn fetch_qr(&self, device: &DeviceIdentity) -> Result<String> {
        let url = self.transport.url(Host::Hk4eSdk, PATH_QR_FETCH)?;
        let body = json!({ "app_id": QR_APP_ID, "device": device.fingerprint });
        let data: QrFetchData =
            self.transport.post(HeaderFamily::Login { device }, url, &body).await?.into_data()?;
        Ok(data.url)
    }

    async fn query_qr(&self, device: &DeviceIdentity, ticket: &str) -> Result<QrStatus> {
        let url = self.transport.url(Host::Hk4eSdk, PATH_QR_QUERY)?;
        let body = json!({ "app_id": QR_APP_ID, "ticket": ticket, "device": device.fingerprint });
        let data: QrQueryData =
            self.transport.post(HeaderFamily::Login { device }, url, &body).await?.into_data()?;

        let state = match data.stat.as_str() {
            "Init" => QrState::Init,
            "Scanned" => QrState::Scanned,
            "Confirmed" => QrState::Confirmed,
            "Expired" => QrState::Expired,
            other => return Err(HoyoSignError::Protocol(format!("unknown qr state {other:?}"))),
        };
        Ok(QrStatus { state, raw_payload: data.payload.and_then(|p| p.raw) })
    }

    #[instrument(skip(self, device, game_token))]
    async fn session_by_game_token(
        &self,
        device: &DeviceIdentity,
        account_id: u64,
        game_token: &str,
    ) -> Result<SessionGrant> {
        let url = self.transport.url(Host::Takumi, PATH_STOKEN_BY_GAME_TOKEN)?;
        let body = json!({ "account_id": account_id, "game_token": game_token });
        let data: SessionData =
            self.transport.post(HeaderFamily::Login { device }, url, &body).await?.into_data()?;
        Ok(SessionGrant { mid: data.user_info.mid, stoken: data.token.token })
    }

    #[instrument(skip_all, fields(account_id = %session.account_id))]
    async fn cookie_token(&self, session: &SessionTokens) -> Result<String> {
        let url = self.transport.url(Host::Takumi, PATH_COOKIE_TOKEN_BY_STOKEN)?;
        let query = [("stoken", session.stoken.as_str()), ("uid", session.account_id.as_str())];
        let data: CookieTokenData = self
            .transport
            .get(HeaderFamily::Enrichment { session }, url, &query)
            .await?
            .into_data()?;
        Ok(data.cookie_token)
    }

    #[instrument(skip_all, fields(account_id = %session.account_id))]
    async fn long_token(&self, session: &SessionTokens) -> Result<String> {
        let url = self.transport.url(Host::Passport, PATH_LTOKEN_BY_STOKEN)?;
        let data: LongTokenData = self
            .transport
            .get(HeaderFamily::Enrichment { session }, url, &[])
            .await?
            .into_data()?;
        Ok(data.ltoken)
    }
}
