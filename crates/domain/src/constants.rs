//! Wire constants
//!
//! Centralized location for the salts, client identity strings and endpoint
//! paths the portal expects. Hosts live in
//! [`EndpointsConfig`](crate::config::EndpointsConfig) so they can be
//! pointed at a local server.

// Signature salts
pub const SALT_WEB: &str = "G1ktdwFL4IyGkHuuWSmz0wUe9Db9scyK";
pub const SALT_APP: &str = "idMMaGYmVgPzh3wxmWudUXKUPGidO7GM";
pub const SALT_LOGIN: &str = "t0qEgfub6cvueAPgR5m9aQWWVciEer7v";

pub const NONCE_V1_LEN: usize = 6;
pub const NONCE_V2_MIN: u32 = 100_001;
pub const NONCE_V2_MAX: u32 = 200_000;
pub const DEVICE_FINGERPRINT_LEN: usize = 64;

// Claim (web view) client identity
pub const ACT_ACCEPT: &str = "application/json, text/plain, */*";
pub const ACT_ACCEPT_LANGUAGE: &str = "zh-CN,en-US;q=0.8";
pub const ACT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 12; Unspecified Device) \
     AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/103.0.5060.129 Mobile \
     Safari/537.36 miHoYoBBS/2.93.1";
pub const ACT_APP_VERSION: &str = "2.93.1";
pub const ACT_CLIENT_TYPE: &str = "5";
pub const ACT_CHANNEL: &str = "miyousheluodi";
pub const ACT_REQUESTED_WITH: &str = "com.mihoyo.hyperion";
pub const ACT_REFERER: &str = "https://act.mihoyo.com/";
pub const ACT_ORIGIN: &str = "https://act.mihoyo.com";
pub const ACT_LANG: &str = "zh-cn";

// Login (passport app) client identity
pub const LOGIN_APP_VERSION: &str = "2.71.1";
pub const LOGIN_GAME_BIZ: &str = "bbs_cn";
pub const LOGIN_SYS_VERSION: &str = "12";
pub const LOGIN_DEVICE_NAME: &str = "Xiaomi MI 6";
pub const LOGIN_DEVICE_MODEL: &str = "MI 6";
pub const LOGIN_APP_ID: &str = "bll8iq97cem8";
pub const LOGIN_CLIENT_TYPE: &str = "4";
pub const LOGIN_USER_AGENT: &str = "okhttp/4.9.3";
pub const QR_APP_ID: &str = "7";

// Paths
pub const PATH_QR_FETCH: &str = "/hk4e_cn/combo/panda/qrcode/fetch";
pub const PATH_QR_QUERY: &str = "/hk4e_cn/combo/panda/qrcode/query";
pub const PATH_STOKEN_BY_GAME_TOKEN: &str = "/account/ma-cn-session/app/getTokenByGameToken";
pub const PATH_COOKIE_TOKEN_BY_STOKEN: &str = "/auth/api/getCookieAccountInfoBySToken";
pub const PATH_LTOKEN_BY_STOKEN: &str = "/account/auth/api/getLTokenBySToken";
pub const PATH_GAME_ROLES: &str = "/binding/api/getUserGameRolesByCookie";

/// Query retcodes meaning "not yet, ask again" while polling a QR ticket.
pub const QR_RETRYABLE_RETCODES: [i64; 2] = [-3503, -102];

// Pacing defaults
pub const DEFAULT_QR_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_QR_MAX_TRANSPORT_FAILURES: u32 = 5;
pub const DEFAULT_GAME_DELAY_MS: u64 = 3_000;
pub const DEFAULT_ACCOUNT_DELAY_MS: u64 = 5_000;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SCHEDULE_TIME: &str = "08:00";

// Claim log
pub const MAX_CLAIM_LOG_ENTRIES: usize = 500;
