//! Activity (claim) gateway over HTTP

use std::sync::Arc;

use async_trait::async_trait;
use hoyosign_core::ClaimGateway;
use hoyosign_domain::constants::ACT_LANG;
use hoyosign_domain::{ClaimInfo, GameDescriptor, Result, Reward, RoleSnapshot, SessionCredential};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::transport::{HeaderFamily, Host, TransportClient};

#[derive(Deserialize)]
struct RoleList {
    #[serde(default)]
    list: Option<Vec<RoleSnapshot>>,
}

#[derive(Deserialize)]
struct Home {
    #[serde(default)]
    awards: Option<Vec<Reward>>,
}

/// [`ClaimGateway`] backed by the takumi activity endpoints.
pub struct HttpClaimGateway {
    transport: Arc<TransportClient>,
}

impl HttpClaimGateway {
    pub fn new(transport: Arc<TransportClient>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ClaimGateway for HttpClaimGateway {
    #[instrument(skip(self, credential, game), fields(game = %game.id))]
    async fn game_roles(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
    ) -> Result<Vec<RoleSnapshot>> {
        let url = self.transport.url(Host::Takumi, game.paths.roles)?;
        let family = HeaderFamily::Act { credential: Some(credential), sign_game: None };
        let data: RoleList =
            self.transport.get(family, url, &[("game_biz", game.game_biz)]).await?.into_data()?;
        Ok(data.list.unwrap_or_default())
    }

    #[instrument(skip(self, credential, game, uid), fields(game = %game.id))]
    async fn claim_info(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
        region: Option<&str>,
        uid: Option<&str>,
    ) -> Result<ClaimInfo> {
        let url = self.transport.url(Host::Takumi, game.paths.info)?;
        let mut query = vec![("act_id", game.act_id), ("lang", ACT_LANG)];
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            query.push(("region", region));
        }
        if let Some(uid) = uid.filter(|u| !u.is_empty()) {
            query.push(("uid", uid));
        }
        let family = HeaderFamily::Act { credential: Some(credential), sign_game: game.sign_game };
        self.transport.get(family, url, &query).await?.into_data()
    }

    async fn rewards(&self, game: &GameDescriptor) -> Result<Vec<Reward>> {
        let url = self.transport.url(Host::Takumi, game.paths.home)?;
        let family = HeaderFamily::Act { credential: None, sign_game: None };
        let data: Home = self
            .transport
            .get(family, url, &[("act_id", game.act_id), ("lang", ACT_LANG)])
            .await?
            .into_data()?;
        Ok(data.awards.unwrap_or_default())
    }

    #[instrument(skip(self, credential, game, role), fields(game = %game.id))]
    async fn submit_claim(
        &self,
        credential: &SessionCredential,
        game: &GameDescriptor,
        role: &RoleSnapshot,
    ) -> Result<()> {
        let url = self.transport.url(Host::Takumi, game.paths.sign)?;
        let body = json!({
            "act_id": game.act_id,
            "lang": ACT_LANG,
            "region": role.region,
            "uid": role.uid,
        });
        let family = HeaderFamily::Act { credential: Some(credential), sign_game: game.sign_game };
        self.transport.post(family, url, &body).await?.ensure_ok()?;
        Ok(())
    }
}
