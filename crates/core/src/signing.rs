//! Request signing
//!
//! The portal authenticates every call with a `DS` header of the form
//! `timestamp,nonce,digest`, where the digest is the lowercase MD5 hex of a
//! salted query string. Two variants exist:
//!
//! - V1 (web and app salts): `salt=<salt>&t=<t>&r=<r>`, nonce of 6 chars
//!   from `[a-z0-9]`
//! - V2 (login salt): `salt=<salt>&t=<t>&r=<r>&b=<body>&q=<query>`, nonce a
//!   decimal integer in `[100001, 200000]`
//!
//! The `*_with` variants take explicit timestamp and nonce for reproducible
//! output.

use std::fmt;

use chrono::Utc;
use hoyosign_domain::constants::{
    DEVICE_FINGERPRINT_LEN, NONCE_V1_LEN, NONCE_V2_MAX, NONCE_V2_MIN, SALT_APP, SALT_LOGIN,
    SALT_WEB,
};
use hoyosign_domain::DeviceIdentity;
use md5::{Digest, Md5};
use rand::Rng;
use uuid::Uuid;

const NONCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Which salt a V1 signature uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltKind {
    /// Activity web views (claims, token enrichment).
    Web,
    /// Native app calls.
    App,
}

impl SaltKind {
    pub const fn salt(self) -> &'static str {
        match self {
            Self::Web => SALT_WEB,
            Self::App => SALT_APP,
        }
    }
}

/// Signature value carried in the `DS` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSecret {
    pub timestamp: i64,
    pub nonce: String,
    pub digest: String,
}

impl fmt::Display for DynamicSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.timestamp, self.nonce, self.digest)
    }
}

/// V1 signature with the current time and a fresh nonce.
pub fn sign_v1(kind: SaltKind) -> DynamicSecret {
    sign_v1_with(kind.salt(), Utc::now().timestamp(), &random_nonce_v1())
}

pub fn sign_v1_with(salt: &str, timestamp: i64, nonce: &str) -> DynamicSecret {
    let digest = md5_hex(&format!("salt={salt}&t={timestamp}&r={nonce}"));
    DynamicSecret { timestamp, nonce: nonce.to_string(), digest }
}

/// V2 signature over the exact query and body strings sent on the wire.
pub fn sign_v2(query: &str, body: &str) -> DynamicSecret {
    sign_v2_with(SALT_LOGIN, Utc::now().timestamp(), random_nonce_v2(), query, body)
}

pub fn sign_v2_with(
    salt: &str,
    timestamp: i64,
    nonce: u32,
    query: &str,
    body: &str,
) -> DynamicSecret {
    let digest = md5_hex(&format!("salt={salt}&t={timestamp}&r={nonce}&b={body}&q={query}"));
    DynamicSecret { timestamp, nonce: nonce.to_string(), digest }
}

/// Fresh random identity for one login attempt or one transport.
pub fn new_device_identity() -> DeviceIdentity {
    DeviceIdentity { device_id: random_device_id(), fingerprint: random_fingerprint() }
}

/// 32 lowercase hex chars (a v4 UUID without dashes).
pub fn random_device_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn random_fingerprint() -> String {
    random_alphanumeric(DEVICE_FINGERPRINT_LEN)
}

fn random_nonce_v1() -> String {
    random_alphanumeric(NONCE_V1_LEN)
}

fn random_nonce_v2() -> u32 {
    rand::thread_rng().gen_range(NONCE_V2_MIN..=NONCE_V2_MAX)
}

fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(NONCE_ALPHABET[rng.gen_range(0..NONCE_ALPHABET.len())])).collect()
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000;

    #[test]
    fn v1_web_golden_value() {
        let ds = sign_v1_with(SALT_WEB, T, "abc123");
        assert_eq!(ds.digest, "80750244523d3b5525be3d889518a400");
        assert_eq!(ds.to_string(), "1700000000,abc123,80750244523d3b5525be3d889518a400");
    }

    #[test]
    fn v1_app_golden_value() {
        let ds = sign_v1_with(SaltKind::App.salt(), T, "abc123");
        assert_eq!(ds.digest, "1a1147e69e4ff70721e9c37bc213210d");
    }

    #[test]
    fn v2_golden_values() {
        let empty = sign_v2_with(SALT_LOGIN, T, 123_456, "", "");
        assert_eq!(empty.digest, "3cd58306dc96c015898854c3404a538d");

        let with_body = sign_v2_with(SALT_LOGIN, T, 123_456, "", r#"{"app_id":"7"}"#);
        assert_eq!(with_body.digest, "30ab5ea8ae28d0a26da17a06a0af489a");
    }

    #[test]
    fn random_nonces_respect_their_alphabets() {
        for _ in 0..200 {
            let v1 = sign_v1(SaltKind::Web);
            assert_eq!(v1.nonce.len(), 6);
            assert!(v1.nonce.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
            assert_eq!(v1.digest.len(), 32);

            let v2 = sign_v2("", "{}");
            let nonce: u32 = v2.nonce.parse().unwrap();
            assert!((100_001..=200_000).contains(&nonce));
        }
    }

    #[test]
    fn device_identity_shape() {
        let identity = new_device_identity();
        assert_eq!(identity.device_id.len(), 32);
        assert!(identity.device_id.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_eq!(identity.fingerprint.len(), 64);
        assert_ne!(new_device_identity().device_id, identity.device_id);
    }
}
