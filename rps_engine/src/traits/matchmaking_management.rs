use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    db_types::{Coins, Game, GameId, NewQueueEntry, PlayerId, QueueEntry},
    traits::data_objects::{BotConnection, BotRequest, MatchStatus, RematchRequest},
};

#[derive(Debug, Clone, Error)]
pub enum MatchmakingError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0} is not one of the allowed stakes")]
    InvalidStake(Coins),
    #[error("{player} cannot cover a stake of {stake}")]
    InsufficientFunds { player: PlayerId, stake: Coins },
    #[error("Game {0} does not exist")]
    GameNotFound(GameId),
    #[error("{player} did not play in {game_id}")]
    NotParticipant { game_id: GameId, player: PlayerId },
    #[error("{0} is not over yet")]
    GameNotOver(GameId),
    #[error("{player} is already playing in {game_id}")]
    AlreadyPlaying { player: PlayerId, game_id: GameId },
    #[error("The opponent, {0}, is already playing another game")]
    OpponentBusy(PlayerId),
    #[error("The opponent, {opponent}, cannot cover a stake of {stake}")]
    OpponentCannotCover { opponent: PlayerId, stake: Coins },
    #[error("No bot can back a stake of {0} right now")]
    BotUnavailable(Coins),
}

impl MatchmakingError {
    /// Storage faults are fatal. Everything else is an expected outcome that left no trace.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MatchmakingError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for MatchmakingError {
    fn from(e: sqlx::Error) -> Self {
        MatchmakingError::DatabaseError(e.to_string())
    }
}

/// The match queue, and game creation for matched players.
///
/// The queue holds at most one entry per player. Finding an opponent, escrowing both stakes, removing both queue
/// entries and creating the game happen in one atomic unit, and two concurrent searches can never claim the same
/// opponent.
#[allow(async_fn_in_trait)]
pub trait MatchmakingManagement {
    /// Adds or refreshes the player's queue entry. A refreshed entry takes the new stake and expiry but keeps its
    /// place in the queue, unless it had already expired.
    async fn enqueue(&self, entry: NewQueueEntry) -> Result<QueueEntry, MatchmakingError>;

    async fn fetch_queue_entry(&self, player: PlayerId) -> Result<Option<QueueEntry>, MatchmakingError>;

    /// The oldest unexpired entry at `stake` that belongs to someone else who can cover the stake. This is a read only
    /// peek; nothing is claimed.
    async fn find_opponent(
        &self,
        player: PlayerId,
        stake: Coins,
        now: DateTime<Utc>,
    ) -> Result<Option<QueueEntry>, MatchmakingError>;

    /// Removes the player's queue entry. Returns `true` if there was one.
    async fn evict_queue_entry(&self, player: PlayerId) -> Result<bool, MatchmakingError>;

    /// Removes every queue entry that expired at or before `now`. Returns the number of entries removed.
    async fn evict_expired_queue_entries(&self, now: DateTime<Utc>) -> Result<u64, MatchmakingError>;

    /// Enqueues the player and tries to match them in one atomic unit.
    ///
    /// 1. If the player is already in an active game, their queue entry is dropped and that game is returned.
    /// 2. The player must be able to cover the stake, otherwise nothing changes and `InsufficientFunds` is returned.
    /// 3. The oldest compatible entry is claimed and its owner's stake is debited. Entries whose owner is in an active
    ///    game, or can no longer cover the stake, are evicted and the search continues.
    /// 4. The player's stake is debited, both entries are removed and the game is created.
    async fn request_match(
        &self,
        entry: NewQueueEntry,
        game_lifetime: Duration,
    ) -> Result<MatchStatus, MatchmakingError>;

    /// Sets up a game against the bot in one atomic unit.
    ///
    /// An existing active game wins over a new bot game, and a compatible human in the queue wins over the bot. If
    /// the pool cannot back the stake, nothing changes (the player's queue entry included) and
    /// [`BotConnection::Unavailable`] is returned.
    async fn connect_bot(&self, request: BotRequest) -> Result<BotConnection, MatchmakingError>;

    /// Starts a new game against whoever `request.player` played in `request.game_id`, at the same stake. The earlier
    /// game must be over, and the requester becomes player 1.
    ///
    /// A human opponent must be free and able to cover the stake. A bot opponent keeps its label, and the bot pool
    /// must be able to back the stake. Both stakes are escrowed, any queue entries for the players are removed and the
    /// game is created in one atomic unit. If anything is refused, nothing changes.
    async fn rematch(&self, request: RematchRequest) -> Result<Game, MatchmakingError>;
}
