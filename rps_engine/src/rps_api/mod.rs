//! # Wagering engine public API
//!
//! The API is split by concern so that an outer service can pick the parts it needs:
//!
//! * [`matchmaking_api`] pairs players, or connects them to the house bot.
//! * [`game_flow_api`] takes moves, reports game state, cancels games and runs the timeout sweep.
//! * [`tournament_api`] manages tournaments and serves the leaderboard.
//! * [`ledger_api`] handles deposits, withdrawals and the bot pool.
//!
//! Every API is created from a backend that implements the traits it needs, plus a [`crate::WagerConfig`]:
//!
//! ```rust,ignore
//! use rps_engine::{events::EventProducers, GameFlowApi, SqliteDatabase, WagerConfig};
//! let db = SqliteDatabase::new_with_url("sqlite://data/rps.db", 25).await?;
//! let api = GameFlowApi::new(db, WagerConfig::from_env_or_default(), EventProducers::default());
//! let receipt = api.submit_move(player, game_id, "rock").await?;
//! ```

pub mod game_flow_api;
pub mod game_objects;
pub mod ledger_api;
pub mod matchmaking_api;
pub mod tournament_api;
