use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Game, GameStatus, PlayerId, Tournament},
    game_machine::SettlementPlan,
};

/// A new game has been created and both stakes are in escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartedEvent {
    pub game: Game,
}

impl GameStartedEvent {
    pub fn new(game: Game) -> Self {
        Self { game }
    }
}

/// A game reached a terminal state. `plan` lists every balance and pool movement made by the settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettledEvent {
    pub game: Game,
    pub plan: SettlementPlan,
}

impl GameSettledEvent {
    pub fn new(game: Game, plan: SettlementPlan) -> Self {
        Self { game, plan }
    }

    pub fn status(&self) -> GameStatus {
        self.game.status
    }
}

/// A tournament stopped counting results, either on request or because it reached its end date. Its standings are
/// final and its rewards can be paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentCompletedEvent {
    pub tournament: Tournament,
}

impl TournamentCompletedEvent {
    pub fn new(tournament: Tournament) -> Self {
        Self { tournament }
    }
}

/// A short message for a player. Delivery is up to whoever registers the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub player: PlayerId,
    pub message: String,
}

impl Notification {
    pub fn new<S: Into<String>>(player: PlayerId, message: S) -> Self {
        Self { player, message: message.into() }
    }
}
