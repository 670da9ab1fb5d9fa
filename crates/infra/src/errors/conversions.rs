//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use hoyosign_domain::HoyoSignError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HoyoSignError);

impl From<InfraError> for HoyoSignError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HoyoSignError> for InfraError {
    fn from(value: HoyoSignError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoHoyoSignError {
    fn into_hoyosign(self) -> HoyoSignError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HoyoSignError */
/* -------------------------------------------------------------------------- */

impl IntoHoyoSignError for HttpError {
    fn into_hoyosign(self) -> HoyoSignError {
        if self.is_timeout() {
            return HoyoSignError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return HoyoSignError::Transport("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return HoyoSignError::Transport(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        if self.is_decode() || self.is_body() {
            return HoyoSignError::Protocol(format!("unreadable response body: {self}"));
        }

        if self.is_builder() {
            return HoyoSignError::Internal(format!("invalid HTTP request: {self}"));
        }

        HoyoSignError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_hoyosign())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → HoyoSignError */
/* -------------------------------------------------------------------------- */

impl IntoHoyoSignError for JsonError {
    fn into_hoyosign(self) -> HoyoSignError {
        if self.is_io() {
            return HoyoSignError::Storage(format!("JSON I/O failure: {self}"));
        }
        HoyoSignError::Storage(format!("invalid JSON document: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_hoyosign())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → HoyoSignError */
/* -------------------------------------------------------------------------- */

impl IntoHoyoSignError for IoError {
    fn into_hoyosign(self) -> HoyoSignError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => HoyoSignError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                HoyoSignError::Storage(format!("permission denied: {self}"))
            }
            _ => HoyoSignError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_hoyosign())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → HoyoSignError */
/* -------------------------------------------------------------------------- */

impl IntoHoyoSignError for TomlError {
    fn into_hoyosign(self) -> HoyoSignError {
        HoyoSignError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_hoyosign())
    }
}

/// Maps any convertible error straight into the domain error.
pub(crate) fn domain<E: Into<InfraError>>(err: E) -> HoyoSignError {
    err.into().into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
