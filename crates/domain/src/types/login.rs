//! QR login state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_domain_keyword_conversions;
use crate::types::credential::{SessionCredential, StageOutcome};

/// Random identity presented to the portal for one login attempt or one
/// transport instance. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// 32 lowercase hex chars.
    pub device_id: String,
    /// 64 chars from `[a-z0-9]`.
    pub fingerprint: String,
}

/// State of a QR ticket as reported by the portal (plus our own `Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrState {
    Init,
    Scanned,
    Confirmed,
    Expired,
    Failed,
}

impl_domain_keyword_conversions!(QrState {
    Init => "init",
    Scanned => "scanned",
    Confirmed => "confirmed",
    Expired => "expired",
    Failed => "failed",
});

impl QrState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Expired | Self::Failed)
    }
}

/// A QR code waiting to be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSession {
    /// URL to render as a QR code.
    pub url: String,
    pub ticket: String,
    pub device: DeviceIdentity,
}

/// Progress reported to the caller while a QR login runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginProgress {
    WaitingForScan,
    Scanned,
    Confirmed,
    Expired,
    ExchangingTokens,
    Failed(String),
}

impl fmt::Display for LoginProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForScan => f.write_str("waiting for scan"),
            Self::Scanned => f.write_str("scanned, awaiting confirmation"),
            Self::Confirmed => f.write_str("login confirmed"),
            Self::Expired => f.write_str("qr code expired"),
            Self::ExchangingTokens => f.write_str("exchanging tokens"),
            Self::Failed(reason) => write!(f, "login failed: {reason}"),
        }
    }
}

/// Terminal result of polling a QR ticket.
#[derive(Clone, PartialEq, Eq)]
pub enum QrPollOutcome {
    Confirmed { account_id: String, game_token: String },
    Expired,
    Failed(String),
    Cancelled,
}

impl QrPollOutcome {
    pub const fn state(&self) -> Option<QrState> {
        match self {
            Self::Confirmed { .. } => Some(QrState::Confirmed),
            Self::Expired => Some(QrState::Expired),
            Self::Failed(_) => Some(QrState::Failed),
            Self::Cancelled => None,
        }
    }
}

impl fmt::Debug for QrPollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { account_id, .. } => f
                .debug_struct("Confirmed")
                .field("account_id", account_id)
                .field("game_token", &"<redacted>")
                .finish(),
            Self::Expired => f.write_str("Expired"),
            Self::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// A completed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub account_id: String,
    pub credential: SessionCredential,
    pub cookie_token: StageOutcome<()>,
    pub long_token: StageOutcome<()>,
}
