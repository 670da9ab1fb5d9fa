//! Claim workflow for one credential across the supported games

use std::sync::Arc;
use std::time::Duration;

use hoyosign_domain::constants::DEFAULT_GAME_DELAY_MS;
use hoyosign_domain::{
    ClaimInfo, ClaimResult, GameDescriptor, GameId, Result, Reward,
    RoleSnapshot, SessionCredential,
};
use tracing::{debug, info, instrument, warn};

use super::ports::ClaimGateway;

enum Step {
    Claimed(String),
    NoRole,
}

/// Runs the per-game claim sequence: roles, info, submit, reward lookup.
pub struct ClaimProtocol {
    gateway: Arc<dyn ClaimGateway>,
    game_delay: Duration,
}

impl ClaimProtocol {
    pub fn new(gateway: Arc<dyn ClaimGateway>) -> Self {
        Self { gateway, game_delay: Duration::from_millis(DEFAULT_GAME_DELAY_MS) }
    }

    /// Pause between two games in [`ClaimProtocol::claim_all`].
    pub const fn with_game_delay(mut self, delay: Duration) -> Self {
        self.game_delay = delay;
        self
    }

    pub async fn list_roles(
        &self,
        credential: &SessionCredential,
        game: GameId,
    ) -> Result<Vec<RoleSnapshot>> {
        self.gateway.game_roles(credential, game.descriptor()).await
    }

    pub async fn get_claim_info(
        &self,
        credential: &SessionCredential,
        game: GameId,
        role: Option<&RoleSnapshot>,
    ) -> Result<ClaimInfo> {
        self.gateway
            .claim_info(
                credential,
                game.descriptor(),
                role.map(|r| r.region.as_str()),
                role.map(|r| r.uid.as_str()),
            )
            .await
    }

    pub async fn list_rewards(&self, game: GameId) -> Result<Vec<Reward>> {
        self.gateway.rewards(game.descriptor()).await
    }

    /// Claim today's reward for the first role of `game`.
    ///
    /// Never fails: every error is folded into an unsuccessful
    /// [`ClaimResult`] carrying whatever role was resolved before it.
    #[instrument(skip(self, credential))]
    pub async fn claim_one(&self, credential: &SessionCredential, game: GameId) -> ClaimResult {
        let descriptor = game.descriptor();
        let mut role = None;

        let result = match self.claim_steps(credential, descriptor, &mut role).await {
            Ok(Step::Claimed(message)) => ClaimResult::succeeded(game, message, role),
            Ok(Step::NoRole) => ClaimResult::failed(game, "no game role found", None),
            Err(err) => {
                warn!(game = %game, error = %err, "Claim failed");
                ClaimResult::failed(game, err.user_message(), role)
            }
        };

        info!(game = %game, success = result.success, message = %result.message, "Claim finished");
        result
    }

    async fn claim_steps(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
        role_slot: &mut Option<RoleSnapshot>,
    ) -> Result<Step> {
        let roles = self.gateway.game_roles(credential, game).await?;
        let Some(role) = roles.into_iter().next() else {
            return Ok(Step::NoRole);
        };
        debug!(game = %game.id, uid = %role.uid, region = %role.region, "Using first role");
        let role = role_slot.insert(role);

        let info = self
            .gateway
            .claim_info(credential, game, Some(&role.region), Some(&role.uid))
            .await?;
        if info.already_claimed {
            return Ok(Step::Claimed(format!(
                "already claimed today (day {})",
                info.total_claim_days
            )));
        }

        self.gateway.submit_claim(credential, game, role).await?;

        // Day N's reward sits at index N-1; today is day total+1.
        let today_index = info.total_claim_days as usize;
        let message = match self.gateway.rewards(game).await {
            Ok(rewards) => match rewards.get(today_index) {
                Some(reward) => format!("claimed: got {} x{}", reward.name, reward.count),
                None => "claimed".to_string(),
            },
            Err(err) => {
                debug!(game = %game.id, error = %err, "Reward lookup failed after claim");
                "claimed".to_string()
            }
        };
        Ok(Step::Claimed(message))
    }

    /// Claim every game in `games`, in order, pausing between games.
    ///
    /// Duplicates are dropped. One failing game never stops the rest.
    #[instrument(skip(self, credential), fields(games = games.len()))]
    pub async fn claim_all(
        &self,
        credential: &SessionCredential,
        games: &[GameId],
    ) -> Vec<ClaimResult> {
        let mut seen = Vec::with_capacity(games.len());
        for game in games {
            if !seen.contains(game) {
                seen.push(*game);
            }
        }

        let mut results = Vec::with_capacity(seen.len());
        for (idx, game) in seen.iter().enumerate() {
            if idx > 0 && !self.game_delay.is_zero() {
                tokio::time::sleep(self.game_delay).await;
            }
            results.push(self.claim_one(credential, *game).await);
        }
        results
    }

    /// Nickname of the first role found, walking games in table order.
    pub async fn discover_nickname(&self, credential: &SessionCredential) -> Option<String> {
        for game in GameId::ALL {
            match self.gateway.game_roles(credential, game.descriptor()).await {
                Ok(roles) => {
                    if let Some(role) = roles.into_iter().find(|r| !r.nickname.is_empty()) {
                        return Some(role.nickname);
                    }
                }
                Err(err) => debug!(game = %game, error = %err, "Role lookup failed"),
            }
        }
        None
    }
}
