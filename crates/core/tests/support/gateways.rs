//! Scripted portal gateways

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hoyosign_core::{ClaimGateway, PassportGateway, QrStatus, SessionGrant};
use hoyosign_domain::{
    ClaimInfo, DeviceIdentity, GameDescriptor, GameId, HoyoSignError, QrState, Result, Reward,
    RoleSnapshot, SessionCredential, SessionTokens,
};
use parking_lot::Mutex;

/// Passport gateway replaying a queue of QR query answers.
///
/// Once the queue is drained every query answers `Init`.
pub struct ScriptedPassport {
    queries: Mutex<VecDeque<Result<QrStatus>>>,
    pub query_count: AtomicUsize,
    pub session: Mutex<Result<SessionGrant>>,
    pub cookie: Mutex<Result<String>>,
    pub long: Mutex<Result<String>>,
    pub seen_devices: Mutex<Vec<String>>,
}

impl ScriptedPassport {
    pub fn new(queries: Vec<Result<QrStatus>>) -> Self {
        Self {
            queries: Mutex::new(queries.into()),
            query_count: AtomicUsize::new(0),
            session: Mutex::new(Ok(SessionGrant { mid: "mid_1".into(), stoken: "st_1".into() })),
            cookie: Mutex::new(Ok("ck_1".into())),
            long: Mutex::new(Ok("lt_1".into())),
            seen_devices: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

pub fn status(state: QrState) -> Result<QrStatus> {
    Ok(QrStatus { state, raw_payload: None })
}

pub fn confirmed(uid: &str, token: &str) -> Result<QrStatus> {
    Ok(QrStatus {
        state: QrState::Confirmed,
        raw_payload: Some(format!(r#"{{"uid":"{uid}","token":"{token}"}}"#)),
    })
}

#[async_trait]
impl PassportGateway for ScriptedPassport {
    async fn fetch_qr(&self, device: &DeviceIdentity) -> Result<String> {
        self.seen_devices.lock().push(device.device_id.clone());
        Ok("https://user.mihoyo.com/qr_code_in_game.html?app_id=7&ticket=tk_1&biz_key=bbs_cn"
            .to_string())
    }

    async fn query_qr(&self, _device: &DeviceIdentity, ticket: &str) -> Result<QrStatus> {
        assert_eq!(ticket, "tk_1");
        self.query_count.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().pop_front().unwrap_or_else(|| status(QrState::Init))
    }

    async fn session_by_game_token(
        &self,
        _device: &DeviceIdentity,
        _account_id: u64,
        _game_token: &str,
    ) -> Result<SessionGrant> {
        self.session.lock().clone()
    }

    async fn cookie_token(&self, _session: &SessionTokens) -> Result<String> {
        self.cookie.lock().clone()
    }

    async fn long_token(&self, _session: &SessionTokens) -> Result<String> {
        self.long.lock().clone()
    }
}

/// Per-game behaviour of [`ScriptedClaims`].
#[derive(Clone)]
pub struct GameScript {
    pub roles: Result<Vec<RoleSnapshot>>,
    pub info: Result<ClaimInfo>,
    pub rewards: Result<Vec<Reward>>,
    pub submit: Result<()>,
}

impl GameScript {
    /// One role, not yet claimed, `total` days claimed so far.
    pub fn claimable(role: RoleSnapshot, total: u32) -> Self {
        Self {
            roles: Ok(vec![role]),
            info: Ok(ClaimInfo { already_claimed: false, total_claim_days: total }),
            rewards: Ok(month_of_rewards()),
            submit: Ok(()),
        }
    }

    pub fn already_claimed(role: RoleSnapshot, total: u32) -> Self {
        Self {
            info: Ok(ClaimInfo { already_claimed: true, total_claim_days: total }),
            ..Self::claimable(role, total)
        }
    }

    pub fn no_roles() -> Self {
        Self {
            roles: Ok(Vec::new()),
            info: Ok(ClaimInfo::default()),
            rewards: Ok(Vec::new()),
            submit: Ok(()),
        }
    }

    pub fn failing(err: HoyoSignError) -> Self {
        Self {
            roles: Err(err),
            info: Ok(ClaimInfo::default()),
            rewards: Ok(Vec::new()),
            submit: Ok(()),
        }
    }
}

/// `reward_1 x1` .. `reward_30 x30`.
pub fn month_of_rewards() -> Vec<Reward> {
    (1..=30).map(|day| Reward { name: format!("reward_{day}"), count: day }).collect()
}

/// Claim gateway answering from per-game scripts and counting submissions.
#[derive(Default)]
pub struct ScriptedClaims {
    scripts: Mutex<HashMap<GameId, GameScript>>,
    submissions: Mutex<Vec<GameId>>,
    calls: Mutex<Vec<(GameId, &'static str)>>,
}

impl ScriptedClaims {
    pub fn with(self, game: GameId, script: GameScript) -> Self {
        self.scripts.lock().insert(game, script);
        self
    }

    pub fn submissions(&self) -> Vec<GameId> {
        self.submissions.lock().clone()
    }

    pub fn calls(&self) -> Vec<(GameId, &'static str)> {
        self.calls.lock().clone()
    }

    fn script(&self, game: &GameDescriptor, call: &'static str) -> GameScript {
        self.calls.lock().push((game.id, call));
        self.scripts
            .lock()
            .get(&game.id)
            .cloned()
            .unwrap_or_else(GameScript::no_roles)
    }
}

#[async_trait]
impl ClaimGateway for ScriptedClaims {
    async fn game_roles(
        &self,
        _credential: &SessionCredential,
        game: &GameDescriptor,
    ) -> Result<Vec<RoleSnapshot>> {
        self.script(game, "roles").roles
    }

    async fn claim_info(
        &self,
        _credential: &SessionCredential,
        game: &GameDescriptor,
        region: Option<&str>,
        uid: Option<&str>,
    ) -> Result<ClaimInfo> {
        assert!(region.is_some() && uid.is_some(), "claim info is scoped to a role");
        self.script(game, "info").info
    }

    async fn rewards(&self, game: &GameDescriptor) -> Result<Vec<Reward>> {
        self.script(game, "rewards").rewards
    }

    async fn submit_claim(
        &self,
        _credential: &SessionCredential,
        game: &GameDescriptor,
        _role: &RoleSnapshot,
    ) -> Result<()> {
        let script = self.script(game, "submit");
        if script.submit.is_ok() {
            self.submissions.lock().push(game.id);
        }
        script.submit
    }
}
