//! Port interface for the activity (claim) API

use async_trait::async_trait;
use hoyosign_domain::{ClaimInfo, GameDescriptor, Result, Reward, RoleSnapshot, SessionCredential};

/// Per-game activity endpoints.
///
/// Implementations decode the portal envelope; a non-zero `retcode` is
/// returned as [`hoyosign_domain::HoyoSignError::Application`].
#[async_trait]
pub trait ClaimGateway: Send + Sync {
    /// Roles bound to the account for `game`. May be empty.
    async fn game_roles(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
    ) -> Result<Vec<RoleSnapshot>>;

    /// Today's claim state, optionally scoped to one role.
    async fn claim_info(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
        region: Option<&str>,
        uid: Option<&str>,
    ) -> Result<ClaimInfo>;

    /// Monthly reward calendar. Needs no credential.
    async fn rewards(&self, game: &GameDescriptor) -> Result<Vec<Reward>>;

    /// Submit today's claim for `role`. Not retried.
    async fn submit_claim(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
        role: &RoleSnapshot,
    ) -> Result<()>;
}
