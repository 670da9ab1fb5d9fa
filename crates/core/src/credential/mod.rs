//! QR login and credential construction

pub mod exchange;
pub mod ports;

pub use exchange::{extract_ticket, CredentialExchange, IgnoreProgress, LoginStatusSink};
pub use ports::{PassportGateway, QrStatus, SessionGrant};
