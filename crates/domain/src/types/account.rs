//! Account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::credential::SessionCredential;
use crate::types::game::GameId;
use crate::types::schedule::ScheduleTime;

fn default_games() -> Vec<GameId> {
    GameId::ALL.to_vec()
}

const fn default_true() -> bool {
    true
}

/// A portal account the tool claims for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Portal account id; unique within the store.
    pub id: String,
    pub name: String,
    pub credential: SessionCredential,
    /// Games to claim, in claim order.
    #[serde(default = "default_games")]
    pub enabled_games: Vec<GameId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_claim_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Account {
    /// New active account with every game enabled.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        credential: SessionCredential,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credential,
            enabled_games: default_games(),
            created_at,
            last_claim_at: None,
            active: true,
        }
    }

    /// Name used when no role nickname could be discovered.
    pub fn fallback_name(id: &str) -> String {
        format!("account_{id}")
    }
}

/// Persisted daily schedule settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub enabled: bool,
    pub time: ScheduleTime,
}
