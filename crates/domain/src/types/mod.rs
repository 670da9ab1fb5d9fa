//! Domain types and models

pub mod account;
pub mod claim;
pub mod credential;
pub mod game;
pub mod login;
pub mod schedule;

pub use account::{Account, ScheduleSettings};
pub use claim::{ClaimInfo, ClaimLogEntry, ClaimResult, Reward, RoleSnapshot};
pub use credential::{SessionCredential, SessionTokens, StageOutcome, TokenChain};
pub use game::{parse_game_list, GameDescriptor, GameId, GamePaths, GAMES};
pub use login::{DeviceIdentity, LoginOutcome, LoginProgress, QrPollOutcome, QrSession, QrState};
pub use schedule::ScheduleTime;
