//! Signed portal transport
//!
//! Every portal call goes through [`TransportClient`], which attaches one of
//! three header families, signs the request and decodes the
//! `{retcode, message, data}` envelope. A non-zero `retcode` is a normal
//! decoded response; callers turn it into an error with
//! [`Envelope::into_data`] or [`Envelope::ensure_ok`].

use hoyosign_core::signing::{new_device_identity, sign_v1, sign_v2, SaltKind};
use hoyosign_domain::constants::{
    ACT_ACCEPT, ACT_ACCEPT_LANGUAGE, ACT_APP_VERSION, ACT_CHANNEL, ACT_CLIENT_TYPE, ACT_ORIGIN,
    ACT_REFERER, ACT_REQUESTED_WITH, ACT_USER_AGENT, LOGIN_APP_ID, LOGIN_APP_VERSION,
    LOGIN_CLIENT_TYPE, LOGIN_DEVICE_MODEL, LOGIN_DEVICE_NAME, LOGIN_GAME_BIZ, LOGIN_SYS_VERSION,
    LOGIN_USER_AGENT,
};
use hoyosign_domain::{
    DeviceIdentity, EndpointsConfig, HoyoSignError, Result, SessionCredential, SessionTokens,
};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

/// Portal host a path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Takumi,
    Hk4eSdk,
    Passport,
}

/// Header set attached to a request.
#[derive(Debug, Clone, Copy)]
pub enum HeaderFamily<'a> {
    /// Activity web view: claims and role lookup. Signed with the web salt.
    Act { credential: Option<&'a SessionCredential>, sign_game: Option<&'a str> },
    /// Passport app: QR login and the game token exchange. Signed over the body.
    Login { device: &'a DeviceIdentity },
    /// Cookie and long token lookups authenticated by the session token.
    Enrichment { session: &'a SessionTokens },
}

/// Decoded `{retcode, message, data}` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub retcode: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub const fn is_ok(&self) -> bool {
        self.retcode == 0
    }

    /// Returns `data` (possibly absent) for a zero retcode.
    ///
    /// # Errors
    /// [`HoyoSignError::Application`] for any other retcode.
    pub fn ensure_ok(self) -> Result<Option<Value>> {
        if self.is_ok() {
            Ok(self.data)
        } else {
            Err(HoyoSignError::application(self.retcode, self.message))
        }
    }

    /// Decodes `data` into `T`.
    ///
    /// # Errors
    /// [`HoyoSignError::Application`] for a non-zero retcode,
    /// [`HoyoSignError::Protocol`] when `data` is missing or has the wrong shape.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        let data = self
            .ensure_ok()?
            .ok_or_else(|| HoyoSignError::Protocol("response carries no data".into()))?;
        serde_json::from_value(data)
            .map_err(|err| HoyoSignError::Protocol(format!("unexpected data shape: {err}")))
    }
}

/// HTTP client bound to the portal hosts and one device identity.
#[derive(Clone)]
pub struct TransportClient {
    http: HttpClient,
    endpoints: EndpointsConfig,
    device: DeviceIdentity,
}

impl TransportClient {
    /// Transport with a freshly generated device identity.
    pub fn new(http: HttpClient, endpoints: EndpointsConfig) -> Self {
        Self { http, endpoints, device: new_device_identity() }
    }

    pub fn with_device(mut self, device: DeviceIdentity) -> Self {
        self.device = device;
        self
    }

    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    /// Absolute URL for `path` on `host`.
    pub fn url(&self, host: Host, path: &str) -> Result<Url> {
        let base = match host {
            Host::Takumi => &self.endpoints.takumi,
            Host::Hk4eSdk => &self.endpoints.hk4e_sdk,
            Host::Passport => &self.endpoints.passport,
        };
        Url::parse(base)
            .and_then(|base| base.join(path))
            .map_err(|err| HoyoSignError::Config(format!("invalid endpoint {base}{path}: {err}")))
    }

    /// Signed GET. Retried on connect failures, timeouts and 5xx.
    pub async fn get(
        &self,
        family: HeaderFamily<'_>,
        mut url: Url,
        query: &[(&str, &str)],
    ) -> Result<Envelope> {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let signed_query = url.query().unwrap_or_default().to_string();
        let builder = self.http.request(Method::GET, url);
        let builder = self.apply_headers(builder, family, &signed_query, "");
        let response = self.http.send(builder).await?;
        decode(response).await
    }

    /// Signed POST with a JSON body. Sent exactly once.
    pub async fn post(
        &self,
        family: HeaderFamily<'_>,
        url: Url,
        body: &Value,
    ) -> Result<Envelope> {
        let body = serde_json::to_string(body)
            .map_err(|err| HoyoSignError::Internal(format!("unserializable request body: {err}")))?;
        let signed_query = url.query().unwrap_or_default().to_string();
        let builder = self.http.request(Method::POST, url);
        let builder = self
            .apply_headers(builder, family, &signed_query, &body)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.http.send_once(builder).await?;
        decode(response).await
    }

    fn apply_headers(
        &self,
        builder: RequestBuilder,
        family: HeaderFamily<'_>,
        query: &str,
        body: &str,
    ) -> RequestBuilder {
        match family {
            HeaderFamily::Act { credential, sign_game } => {
                let mut builder = builder
                    .header(ACCEPT, ACT_ACCEPT)
                    .header(ACCEPT_LANGUAGE, ACT_ACCEPT_LANGUAGE)
                    .header(USER_AGENT, ACT_USER_AGENT)
                    .header("x-rpc-app_version", ACT_APP_VERSION)
                    .header("x-rpc-client_type", ACT_CLIENT_TYPE)
                    .header("x-rpc-device_id", &self.device.device_id)
                    .header("x-rpc-channel", ACT_CHANNEL)
                    .header("X-Requested-With", ACT_REQUESTED_WITH)
                    .header(REFERER, ACT_REFERER)
                    .header(ORIGIN, ACT_ORIGIN)
                    .header("DS", sign_v1(SaltKind::Web).to_string());
                if let Some(sign_game) = sign_game {
                    builder = builder.header("x-rpc-signgame", sign_game);
                }
                if let Some(credential) = credential {
                    builder = builder.header(COOKIE, credential.as_str());
                }
                builder
            }
            HeaderFamily::Login { device } => builder
                .header("x-rpc-app_version", LOGIN_APP_VERSION)
                .header("DS", sign_v2(query, body).to_string())
                .header("x-rpc-aigis", "")
                .header(ACCEPT, "application/json")
                .header("x-rpc-game_biz", LOGIN_GAME_BIZ)
                .header("x-rpc-sys_version", LOGIN_SYS_VERSION)
                .header("x-rpc-device_id", &device.device_id)
                .header("x-rpc-device_name", LOGIN_DEVICE_NAME)
                .header("x-rpc-device_model", LOGIN_DEVICE_MODEL)
                .header("x-rpc-app_id", LOGIN_APP_ID)
                .header("x-rpc-client_type", LOGIN_CLIENT_TYPE)
                .header(USER_AGENT, LOGIN_USER_AGENT),
            HeaderFamily::Enrichment { session } => builder
                .header(
                    COOKIE,
                    format!(
                        "stuid={}; stoken={}; mid={}",
                        session.account_id, session.stoken, session.mid
                    ),
                )
                .header("DS", sign_v1(SaltKind::Web).to_string())
                .header("x-rpc-app_version", ACT_APP_VERSION)
                .header("x-rpc-client_type", ACT_CLIENT_TYPE)
                .header(USER_AGENT, LOGIN_USER_AGENT),
        }
    }
}

async fn decode(response: Response) -> Result<Envelope> {
    let status = response.status();
    let path = response.url().path().to_string();
    if !status.is_success() {
        return Err(HoyoSignError::Transport(format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        )));
    }

    let bytes = response.bytes().await.map_err(crate::errors::domain)?;
    let envelope: Envelope = serde_json::from_slice(&bytes)
        .map_err(|err| HoyoSignError::Protocol(format!("response is not a portal envelope: {err}")))?;

    if !envelope.is_ok() {
        debug!(%path, retcode = envelope.retcode, message = %envelope.message, "portal returned non-zero retcode");
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use hoyosign_core::signing::sign_v2_with;
    use hoyosign_domain::constants::SALT_LOGIN;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    fn transport(server: &MockServer) -> TransportClient {
        let http = HttpClient::builder()
            .max_attempts(2)
            .base_backoff(std::time::Duration::from_millis(5))
            .build()
            .expect("http client");
        TransportClient::new(http, EndpointsConfig::all(server.uri()))
    }

    fn header_value(request: &Request, name: &str) -> String {
        request
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn act_family_sends_identity_signgame_and_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event/luna/info"))
            .and(query_param("act_id", "e1"))
            .and(header("x-rpc-signgame", "hk4e"))
            .and(header("x-rpc-client_type", "5"))
            .and(header("x-rpc-channel", "miyousheluodi"))
            .and(header("Cookie", "stuid=1; stoken=s"))
            .and(header_exists("DS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retcode": 0, "message": "OK", "data": {"is_sign": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = transport(&server);
        let credential = SessionCredential::parse("stuid=1; stoken=s").unwrap();
        let url = client.url(Host::Takumi, "/event/luna/info").unwrap();
        let envelope = client
            .get(
                HeaderFamily::Act { credential: Some(&credential), sign_game: Some("hk4e") },
                url,
                &[("act_id", "e1")],
            )
            .await
            .unwrap();

        assert!(envelope.is_ok());
        let requests = server.received_requests().await.unwrap();
        assert_eq!(header_value(&requests[0], "x-rpc-device_id"), client.device().device_id);
        let ds = header_value(&requests[0], "DS");
        assert_eq!(ds.split(',').count(), 3);
    }

    /// Validates the login header family.
    ///
    /// Assertions:
    /// - The body is sent byte-for-byte as signed
    /// - `DS` is the V2 digest over that body and an empty query
    /// - The device id comes from the login attempt, not the transport
    #[tokio::test]
    async fn login_family_signs_exact_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hk4e_cn/combo/panda/qrcode/fetch"))
            .and(header("Content-Type", "application/json"))
            .and(header("x-rpc-app_id", "bll8iq97cem8"))
            .and(header_exists("x-rpc-aigis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retcode": 0, "message": "OK", "data": {"url": "https://x/?ticket=t"}
            })))
            .mount(&server)
            .await;

        let client = transport(&server);
        let device = new_device_identity();
        let body = json!({"app_id": "7", "device": device.fingerprint});
        let url = client.url(Host::Hk4eSdk, "/hk4e_cn/combo/panda/qrcode/fetch").unwrap();
        client.post(HeaderFamily::Login { device: &device }, url, &body).await.unwrap();

        let request = &server.received_requests().await.unwrap()[0];
        let sent_body = String::from_utf8(request.body.clone()).unwrap();
        assert_eq!(sent_body, serde_json::to_string(&body).unwrap());
        assert_eq!(header_value(request, "x-rpc-device_id"), device.device_id);

        let ds = header_value(request, "DS");
        let parts: Vec<&str> = ds.split(',').collect();
        let expected = sign_v2_with(
            SALT_LOGIN,
            parts[0].parse().unwrap(),
            parts[1].parse().unwrap(),
            "",
            &sent_body,
        );
        assert_eq!(ds, expected.to_string());
    }

    #[tokio::test]
    async fn enrichment_family_carries_session_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Cookie", "stuid=10001; stoken=st; mid=m"))
            .and(header("User-Agent", "okhttp/4.9.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retcode": 0, "message": "OK", "data": {"ltoken": "lt"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = transport(&server);
        let session =
            SessionTokens { account_id: "10001".into(), mid: "m".into(), stoken: "st".into() };
        let url = client.url(Host::Passport, "/account/auth/api/getLTokenBySToken").unwrap();
        let envelope = client.get(HeaderFamily::Enrichment { session: &session }, url, &[]).await;

        assert_eq!(envelope.unwrap().data, Some(json!({"ltoken": "lt"})));
    }

    #[tokio::test]
    async fn non_zero_retcode_is_a_decoded_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retcode": -5003, "message": "already signed", "data": null
            })))
            .mount(&server)
            .await;

        let client = transport(&server);
        let url = client.url(Host::Takumi, "/event/luna/sign").unwrap();
        let envelope = client
            .post(HeaderFamily::Act { credential: None, sign_game: None }, url, &json!({}))
            .await
            .unwrap();

        assert_eq!(envelope.retcode, -5003);
        let err = envelope.ensure_ok().unwrap_err();
        assert_eq!(err.retcode(), Some(-5003));
        assert_eq!(err.user_message(), "already signed");
    }

    #[tokio::test]
    async fn post_is_not_retried_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let client = transport(&server);
        let url = client.url(Host::Takumi, "/event/luna/sign").unwrap();
        let err = client
            .post(HeaderFamily::Act { credential: None, sign_game: None }, url, &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, HoyoSignError::Transport(msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn get_is_retried_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let client = transport(&server);
        let url = client.url(Host::Takumi, "/event/luna/home").unwrap();
        let err = client
            .get(HeaderFamily::Act { credential: None, sign_game: None }, url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, HoyoSignError::Transport(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_protocol_violation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = transport(&server);
        let url = client.url(Host::Takumi, "/event/luna/home").unwrap();
        let err = client
            .get(HeaderFamily::Act { credential: None, sign_game: None }, url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, HoyoSignError::Protocol(_)));
    }

    #[test]
    fn into_data_requires_data_of_the_right_shape() {
        #[derive(Debug, Deserialize)]
        struct Awards {
            #[allow(dead_code)]
            awards: Vec<Value>,
        }

        let missing = Envelope { retcode: 0, message: "OK".into(), data: None };
        assert!(matches!(missing.into_data::<Awards>(), Err(HoyoSignError::Protocol(_))));

        let wrong = Envelope { retcode: 0, message: "OK".into(), data: Some(json!({"list": []})) };
        assert!(matches!(wrong.into_data::<Awards>(), Err(HoyoSignError::Protocol(_))));
    }

    #[test]
    fn url_joins_host_and_path() {
        let http = HttpClient::new().unwrap();
        let client = TransportClient::new(http, EndpointsConfig::default());
        let url = client.url(Host::Passport, "/account/auth/api/getLTokenBySToken").unwrap();
        assert_eq!(
            url.as_str(),
            "https://passport-api.mihoyo.com/account/auth/api/getLTokenBySToken"
        );
    }
}
