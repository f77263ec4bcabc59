//! Rock-paper-scissors wagering engine
//!
//! This library pairs players, escrows their stakes, stands in a house-funded bot when no human is available, takes
//! moves, and settles every game exactly once. It is transport-agnostic: an outer service supplies the players, calls
//! the APIs and delivers the notifications.
//!
//! The library is divided into these sections:
//! 1. Storage. The backend contracts live in [`mod@traits`], and [`SqliteDatabase`] implements them. You should never
//!    need to access the database directly. The data types that are stored are defined in [`mod@db_types`].
//! 2. The game rules ([`mod@rules`]) and the game state machine ([`mod@game_machine`]). These are pure, and decide what
//!    a move or a timeout does to a game, and how the bank is distributed.
//! 3. The public API ([`MatchmakingApi`], [`GameFlowApi`], [`TournamentApi`] and [`LedgerApi`]).
//!
//! The engine also publishes events when games start and settle, and sends player notifications through a hook. See
//! [`mod@events`].
pub mod config;
pub mod db_types;
pub mod events;
#[cfg(feature = "sqlite")]
pub mod expiry_worker;
pub mod game_machine;
pub mod helpers;
pub mod rules;
pub mod traits;

mod rps_api;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use config::WagerConfig;
pub use rps_api::{
    game_flow_api::GameFlowApi,
    game_objects,
    ledger_api::LedgerApi,
    matchmaking_api::MatchmakingApi,
    tournament_api::TournamentApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::new_pool, SqliteDatabase};
pub use traits::{
    BotPoolManagement,
    GameManagement,
    LedgerManagement,
    MatchmakingManagement,
    TournamentManagement,
    WagerDatabase,
};
