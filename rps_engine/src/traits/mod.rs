//! # Backend contracts
//!
//! The traits in this module define what a storage backend must provide to run the wagering engine. Every method that
//! mutates shared state (balances, the bot pool, the match queue, games, tournaments) is a single atomic unit: either it
//! commits completely, or it leaves no trace.
//!
//! * [`LedgerManagement`] is the player balance ledger: atomic debits and credits, and balance reads.
//! * [`BotPoolManagement`] manages the house funds that back bot opponents.
//! * [`MatchmakingManagement`] owns the match queue and creates games when opponents are found.
//! * [`GameManagement`] records moves and settles games, exactly once each.
//! * [`TournamentManagement`] tracks tournament standings and pays out tournament rewards.
//! * [`WagerDatabase`] ties all of the above together.
mod bot_pool_management;
mod data_objects;
mod game_management;
mod ledger_management;
mod matchmaking_management;
mod tournament_management;
mod wager_database;

pub use bot_pool_management::{BotPoolError, BotPoolManagement};
pub use data_objects::{
    BotConnection,
    BotRequest,
    MatchStatus,
    MoveOutcome,
    MoveSubmission,
    RematchRequest,
    SettledGame,
};
pub use game_management::{GameFlowError, GameManagement};
pub use ledger_management::{LedgerError, LedgerManagement};
pub use matchmaking_management::{MatchmakingError, MatchmakingManagement};
pub use tournament_management::{TournamentError, TournamentManagement};
pub use wager_database::WagerDatabase;
