//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for hoyosign
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HoyoSignError {
    /// The request never produced a usable HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The portal answered with a non-zero `retcode`.
    #[error("Application error {retcode}: {message}")]
    Application { retcode: i64, message: String },

    /// The portal answered, but not in the shape we expect.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// A QR login ended without a confirmed scan (expired or rejected).
    #[error("Login failed: {0}")]
    Login(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HoyoSignError {
    /// Builds an [`HoyoSignError::Application`] from an envelope's fields.
    pub fn application(retcode: i64, message: impl Into<String>) -> Self {
        Self::Application { retcode, message: message.into() }
    }

    /// Returns the portal `retcode` when this is an application error.
    pub fn retcode(&self) -> Option<i64> {
        match self {
            Self::Application { retcode, .. } => Some(*retcode),
            _ => None,
        }
    }

    /// Message suitable for a claim result or a CLI line.
    ///
    /// Application errors surface the server message verbatim. Protocol
    /// violations collapse to a generic message since their detail is only
    /// useful in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Application { message, .. } if !message.is_empty() => message.clone(),
            Self::Application { retcode, .. } => format!("request rejected (retcode {retcode})"),
            Self::Protocol(_) => "unexpected response from server".to_string(),
            Self::Transport(detail) => format!("network error: {detail}"),
            other => other.to_string(),
        }
    }
}

/// Result type alias for hoyosign operations
pub type Result<T> = std::result::Result<T, HoyoSignError>;
