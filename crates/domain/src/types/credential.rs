//! Session credential and the token chain it is built from

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{HoyoSignError, Result};

const PAIR_SEPARATOR: &str = "; ";

/// Outcome of an optional step in a multi-step exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Ok(T),
    Skipped,
    Failed(String),
}

impl<T> StageOutcome<T> {
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Maps the success value, keeping `Skipped`/`Failed` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutcome<U> {
        match self {
            Self::Ok(value) => StageOutcome::Ok(f(value)),
            Self::Skipped => StageOutcome::Skipped,
            Self::Failed(reason) => StageOutcome::Failed(reason),
        }
    }
}

impl<T> From<Result<T>> for StageOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Failed(err.user_message()),
        }
    }
}

/// Tokens required for any usable credential.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Portal account id (`stuid`).
    pub account_id: String,
    pub mid: String,
    pub stoken: String,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("account_id", &self.account_id)
            .field("mid", &self.mid)
            .field("stoken", &"<redacted>")
            .finish()
    }
}

/// Everything the exchange produced, mandatory and optional parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenChain {
    pub session: SessionTokens,
    pub cookie_token: StageOutcome<String>,
    pub long_token: StageOutcome<String>,
}

/// Composite `key=value; key=value` credential replayed as a `Cookie` header.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Builds the credential from a token chain.
    ///
    /// Field order: the account id under its five names, `stoken`, `mid`,
    /// `ltmid_v2`; then the cookie token group when that stage succeeded;
    /// then the long token group when that stage succeeded.
    pub fn from_chain(chain: &TokenChain) -> Self {
        let SessionTokens { account_id, mid, stoken } = &chain.session;

        let mut pairs = vec![
            format!("stuid={account_id}"),
            format!("ltuid={account_id}"),
            format!("ltuid_v2={account_id}"),
            format!("account_id={account_id}"),
            format!("account_id_v2={account_id}"),
            format!("stoken={stoken}"),
            format!("mid={mid}"),
            format!("ltmid_v2={mid}"),
        ];

        if let StageOutcome::Ok(cookie_token) = &chain.cookie_token {
            pairs.push(format!("cookie_token={cookie_token}"));
            pairs.push(format!("cookie_token_v2={cookie_token}"));
            pairs.push(format!("account_mid_v2={mid}"));
        }

        if let StageOutcome::Ok(long_token) = &chain.long_token {
            pairs.push(format!("ltoken={long_token}"));
            pairs.push(format!("ltoken_v2={long_token}"));
        }

        Self(pairs.join(PAIR_SEPARATOR))
    }

    /// Accepts a credential captured elsewhere (for example a browser cookie).
    ///
    /// # Errors
    /// Returns [`HoyoSignError::Validation`] if the string holds no
    /// `key=value` pair.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        let has_pair = trimmed
            .split(';')
            .any(|pair| pair.split_once('=').is_some_and(|(k, _)| !k.trim().is_empty()));
        if !has_pair {
            return Err(HoyoSignError::Validation(
                "credential must contain at least one key=value pair".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates `(key, value)` pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Portal account id, read from `stuid` or `account_id`.
    pub fn account_id(&self) -> Option<&str> {
        self.get("stuid").or_else(|| self.get("account_id"))
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCredential").field(&"<redacted>").finish()
    }
}

impl TryFrom<String> for SessionCredential {
    type Error = HoyoSignError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SessionCredential> for String {
    fn from(value: SessionCredential) -> Self {
        value.0
    }
}
