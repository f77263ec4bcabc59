use thiserror::Error;

use crate::db_types::{BotPool, Coins};

#[derive(Debug, Clone, Error)]
pub enum BotPoolError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The bot pool has not been initialised")]
    PoolNotInitialised,
    #[error("Bot pool amounts must be positive, but {0} was given")]
    InvalidAmount(Coins),
}

impl From<sqlx::Error> for BotPoolError {
    fn from(e: sqlx::Error) -> Self {
        BotPoolError::DatabaseError(e.to_string())
    }
}

/// The house-funded bot pool. A single shared counter pair: `total_balance` and `used_balance`, with
/// `0 <= used_balance <= total_balance` at all times.
#[allow(async_fn_in_trait)]
pub trait BotPoolManagement {
    async fn fetch_bot_pool(&self) -> Result<BotPool, BotPoolError>;

    /// Marks `amount` of the pool as in use, if no more than `min(bot_cap, available)` is being asked for.
    /// Returns `false`, with no change made, if the pool cannot back the stake.
    async fn reserve_bot_stake(&self, amount: Coins, bot_cap: Coins) -> Result<bool, BotPoolError>;

    /// Returns `amount` to the pool. The used balance never drops below zero.
    async fn release_bot_stake(&self, amount: Coins) -> Result<BotPool, BotPoolError>;

    /// Adds house funds to the pool.
    async fn fund_bot_pool(&self, amount: Coins) -> Result<BotPool, BotPoolError>;
}
