use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    db_types::{Game, GameId, GameStatus, Move, PlayerId, PlayerStats},
    game_machine::CancelReason,
    traits::data_objects::{MoveOutcome, MoveSubmission, SettledGame},
};

#[derive(Debug, Clone, Error)]
pub enum GameFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Game {0} does not exist")]
    GameNotFound(GameId),
    #[error("{player} is not playing in {game_id}")]
    NotParticipant { game_id: GameId, player: PlayerId },
    #[error("{game_id} is already {status}")]
    AlreadyTerminal { game_id: GameId, status: GameStatus },
    #[error("A different move ({recorded}) has already been recorded in {game_id}")]
    MoveAlreadyRecorded { game_id: GameId, recorded: Move },
    #[error("{0} has expired")]
    GameExpired(GameId),
    #[error("Invalid move: {0}")]
    InvalidMove(String),
}

impl GameFlowError {
    /// Storage faults are fatal. Everything else is an expected outcome that left no trace.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameFlowError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for GameFlowError {
    fn from(e: sqlx::Error) -> Self {
        GameFlowError::DatabaseError(e.to_string())
    }
}

/// Game records, move submission and settlement.
///
/// Every mutating method holds the game's lock from the moment it reads the game until it commits, and checks that
/// the game is still active under that lock. This is what guarantees that each game is settled exactly once, no matter
/// how many moves, sweeps and cancellations race against it.
#[allow(async_fn_in_trait)]
pub trait GameManagement {
    async fn fetch_game(&self, game_id: GameId) -> Result<Option<Game>, GameFlowError>;

    async fn fetch_active_game_for_player(&self, player: PlayerId) -> Result<Option<Game>, GameFlowError>;

    /// The player's most recent finished or cancelled games, newest first.
    async fn fetch_recent_games(&self, player: PlayerId, limit: i64) -> Result<Vec<Game>, GameFlowError>;

    /// Records across all finished games, ordered by wins and then by games played. Ties beyond that go to the lower
    /// player id.
    async fn fetch_top_players(&self, limit: i64) -> Result<Vec<PlayerStats>, GameFlowError>;

    /// Records a move, and settles the game if the move completes it. See [`crate::game_machine::accept_move`].
    async fn submit_move(&self, submission: MoveSubmission) -> Result<MoveOutcome, GameFlowError>;

    /// Settles the game if it is overdue (see [`crate::game_machine::pending_resolution`]). Returns `None` if the game
    /// is already terminal or is not yet due.
    async fn resolve_if_due(
        &self,
        game_id: GameId,
        now: DateTime<Utc>,
        move_timeout: Duration,
    ) -> Result<Option<SettledGame>, GameFlowError>;

    /// Cancels an active game and refunds every stake. A [`CancelReason::Requested`] cancellation must come from a
    /// participant.
    async fn cancel_game(
        &self,
        game_id: GameId,
        reason: CancelReason,
        now: DateTime<Utc>,
    ) -> Result<SettledGame, GameFlowError>;

    /// Active games that have expired, or where one side moved and the move timer has run out.
    async fn fetch_overdue_game_ids(
        &self,
        now: DateTime<Utc>,
        move_timeout: Duration,
    ) -> Result<Vec<GameId>, GameFlowError>;
}
