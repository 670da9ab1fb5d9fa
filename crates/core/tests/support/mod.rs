//! Shared test helpers for `hoyosign-core` integration tests.
//!
//! Scripted gateways stand in for the portal; in-memory stores and a
//! recording sink stand in for persistence.

#![allow(dead_code)]

pub mod gateways;
pub mod stores;

use hoyosign_domain::{RoleSnapshot, SessionCredential};

pub fn credential() -> SessionCredential {
    SessionCredential::parse("stuid=10001; stoken=st; mid=m").expect("valid test credential")
}

pub fn role(nickname: &str, uid: &str) -> RoleSnapshot {
    RoleSnapshot {
        nickname: nickname.to_string(),
        uid: uid.to_string(),
        region: "cn_gf01".to_string(),
        level: 60,
    }
}
