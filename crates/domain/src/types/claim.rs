//! Claim types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::game::GameId;

/// The in-game character a claim is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    #[serde(default)]
    pub nickname: String,
    /// In-game uid.
    #[serde(alias = "game_uid")]
    pub uid: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub level: u32,
}

/// Today's claim status for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInfo {
    #[serde(rename = "is_sign", default)]
    pub already_claimed: bool,
    #[serde(rename = "total_sign_day", default)]
    pub total_claim_days: u32,
}

/// One entry of the monthly reward calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    #[serde(rename = "cnt", default)]
    pub count: u32,
}

/// Result of one claim for one game. A claim attempt always yields one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResult {
    pub game: GameId,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleSnapshot>,
}

impl ClaimResult {
    pub fn succeeded(game: GameId, message: impl Into<String>, role: Option<RoleSnapshot>) -> Self {
        Self { game, success: true, message: message.into(), role }
    }

    pub fn failed(game: GameId, message: impl Into<String>, role: Option<RoleSnapshot>) -> Self {
        Self { game, success: false, message: message.into(), role }
    }
}

/// Persisted record of a claim result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLogEntry {
    pub account_id: String,
    pub account_name: String,
    pub game: GameId,
    pub game_name: String,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleSnapshot>,
}

impl ClaimLogEntry {
    pub fn from_result(
        account_id: &str,
        account_name: &str,
        result: &ClaimResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            account_name: account_name.to_string(),
            game: result.game,
            game_name: result.game.descriptor().name.to_string(),
            success: result.success,
            message: result.message.clone(),
            timestamp,
            role: result.role.clone(),
        }
    }
}
