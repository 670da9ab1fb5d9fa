//! Static game table

use serde::{Deserialize, Serialize};

use crate::constants::PATH_GAME_ROLES;
use crate::impl_domain_keyword_conversions;

/// Games with a daily check-in activity.
///
/// Ordering follows the game table and is the order used when a caller asks
/// for "all games".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Genshin,
    Starrail,
    Zzz,
}

impl_domain_keyword_conversions!(GameId {
    Genshin => "genshin",
    Starrail => "starrail",
    Zzz => "zzz",
});

impl GameId {
    /// Every supported game in table order.
    pub const ALL: [Self; 3] = [Self::Genshin, Self::Starrail, Self::Zzz];

    /// Static descriptor for this game.
    pub const fn descriptor(self) -> &'static GameDescriptor {
        match self {
            Self::Genshin => &GAMES[0],
            Self::Starrail => &GAMES[1],
            Self::Zzz => &GAMES[2],
        }
    }
}

/// Request paths for one game's activity, relative to the takumi host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePaths {
    pub sign: &'static str,
    pub info: &'static str,
    pub home: &'static str,
    pub award: &'static str,
    pub roles: &'static str,
}

/// Immutable per-game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameDescriptor {
    pub id: GameId,
    pub name: &'static str,
    pub act_id: &'static str,
    /// Business-zone tag used for role lookup.
    pub game_biz: &'static str,
    /// Value of `x-rpc-signgame` on info and sign requests.
    pub sign_game: Option<&'static str>,
    pub paths: GamePaths,
}

const LUNA_PATHS: GamePaths = GamePaths {
    sign: "/event/luna/sign",
    info: "/event/luna/info",
    home: "/event/luna/home",
    award: "/event/luna/award",
    roles: PATH_GAME_ROLES,
};

/// The game table.
pub static GAMES: [GameDescriptor; 3] = [
    GameDescriptor {
        id: GameId::Genshin,
        name: "原神",
        act_id: "e202311201442471",
        game_biz: "hk4e_cn",
        sign_game: Some("hk4e"),
        paths: LUNA_PATHS,
    },
    GameDescriptor {
        id: GameId::Starrail,
        name: "崩坏：星穹铁道",
        act_id: "e202304121516551",
        game_biz: "hkrpg_cn",
        sign_game: Some("hkrpg"),
        paths: LUNA_PATHS,
    },
    GameDescriptor {
        id: GameId::Zzz,
        name: "绝区零",
        act_id: "e202406242138391",
        game_biz: "nap_cn",
        sign_game: Some("zzz"),
        paths: GamePaths {
            sign: "/event/luna/zzz/sign",
            info: "/event/luna/zzz/info",
            home: "/event/luna/zzz/home",
            award: "/event/luna/zzz/award",
            roles: PATH_GAME_ROLES,
        },
    },
];

/// Parses a comma separated list such as `genshin,zzz`.
///
/// Duplicates are dropped, order is preserved, blank items are ignored.
pub fn parse_game_list(input: &str) -> crate::Result<Vec<GameId>> {
    let mut games = Vec::new();
    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let game: GameId = item.parse()?;
        if !games.contains(&game) {
            games.push(game);
        }
    }
    Ok(games)
}
