use thiserror::Error;

use crate::db_types::{Coins, GameId, JournalEntry, PlayerId};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{player} cannot cover {required}")]
    InsufficientFunds { player: PlayerId, required: Coins },
    #[error("Ledger amounts must be positive, but {0} was given")]
    InvalidAmount(Coins),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The player balance ledger.
///
/// Balances are only ever changed by a single conditional statement against the player's row, so concurrent
/// adjustments to the same player serialise and a balance can never go negative. Every adjustment is recorded in the
/// ledger journal.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// The player's current balance. Players without a ledger row have a zero balance.
    async fn balance(&self, player: PlayerId) -> Result<Coins, LedgerError>;

    /// Adds `amount` to the player's balance, creating their ledger row if necessary. Returns the new balance.
    async fn credit(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError>;

    /// Removes `amount` from the player's balance if, and only if, they can cover it. Returns the new balance, or
    /// [`LedgerError::InsufficientFunds`] with no change made.
    async fn debit(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError>;

    /// The sum of every player balance.
    async fn total_player_balances(&self) -> Result<Coins, LedgerError>;

    /// Every journal entry that references the given game, oldest first.
    async fn fetch_journal_for_game(&self, game_id: GameId) -> Result<Vec<JournalEntry>, LedgerError>;
}
