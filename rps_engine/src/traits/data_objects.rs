use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Coins, Game, GameId, Move, PlayerId, QueueEntry, TournamentId},
    game_machine::SettlementPlan,
};

/// The answer to a "find me an opponent" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// The player was already in an active game. No funds were moved.
    AlreadyPlaying(Game),
    /// An opponent was found and a new game has been created.
    Matched(Game),
    /// Nobody compatible is waiting. The player's queue entry is in place.
    Searching(QueueEntry),
}

impl MatchStatus {
    pub fn game(&self) -> Option<&Game> {
        match self {
            MatchStatus::AlreadyPlaying(g) | MatchStatus::Matched(g) => Some(g),
            MatchStatus::Searching(_) => None,
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self, MatchStatus::Searching(_))
    }
}

/// Everything needed to set up a game against the house bot.
#[derive(Debug, Clone)]
pub struct BotRequest {
    pub player: PlayerId,
    pub stake: Coins,
    pub tournament_id: Option<TournamentId>,
    pub bot_label: String,
    pub bot_cap: Coins,
    pub game_lifetime: Duration,
    pub now: DateTime<Utc>,
}

/// The answer to a "connect me to a bot" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotConnection {
    /// The player was already in an active game, which is returned instead of a new bot game.
    AlreadyPlaying(Game),
    /// A human opponent turned up in the queue after all, and a regular game was created.
    MatchedHuman(Game),
    /// A new game against the bot.
    Connected(Game),
    /// The bot pool cannot back the stake right now. Nothing was changed.
    Unavailable,
}

impl BotConnection {
    pub fn game(&self) -> Option<&Game> {
        match self {
            BotConnection::AlreadyPlaying(g) | BotConnection::MatchedHuman(g) | BotConnection::Connected(g) => Some(g),
            BotConnection::Unavailable => None,
        }
    }
}

/// Everything needed to start a new game against the opponent of a game that is over.
#[derive(Debug, Clone)]
pub struct RematchRequest {
    pub player: PlayerId,
    pub game_id: GameId,
    pub tournament_id: Option<TournamentId>,
    /// Used if the earlier game was against a bot that had no label.
    pub fallback_bot_label: String,
    pub bot_cap: Coins,
    pub game_lifetime: Duration,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MoveSubmission {
    pub game_id: GameId,
    pub player: PlayerId,
    pub mv: Move,
    /// The bot's answer, used if this is a bot game that the bot has not moved in yet.
    pub bot_reply: Move,
    pub move_timeout: Duration,
    pub now: DateTime<Utc>,
}

/// A game that has just reached a terminal state, with the plan that was applied to settle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledGame {
    pub game: Game,
    pub plan: SettlementPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was recorded; the opponent has not moved yet.
    Waiting(Game),
    /// The move completed the game, which has been settled.
    Settled(SettledGame),
    /// The game had expired. It was resolved as a timeout and the move was not recorded.
    Expired(SettledGame),
}
