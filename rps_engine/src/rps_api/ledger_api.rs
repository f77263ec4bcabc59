use std::fmt::Debug;

use log::*;

use crate::{
    config::WagerConfig,
    db_types::{BotPool, Coins, GameId, JournalEntry, PlayerId},
    traits::{BotPoolError, BotPoolManagement, LedgerError, LedgerManagement},
};

/// Player balances and the house bot pool.
///
/// Deposits and withdrawals are the outer service's way of moving funds in and out of the game. Every movement is
/// journalled.
pub struct LedgerApi<B> {
    db: B,
    config: WagerConfig,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B> {
    pub fn new(db: B, config: WagerConfig) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement + BotPoolManagement
{
    pub async fn balance(&self, player: PlayerId) -> Result<Coins, LedgerError> {
        self.db.balance(player).await
    }

    /// Returns the new balance.
    pub async fn deposit(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError> {
        let balance = self.db.credit(player, amount).await?;
        info!("🗃️ {player} deposited {amount}");
        Ok(balance)
    }

    /// Returns the new balance. Fails with `InsufficientFunds` without touching the balance if it would go negative.
    pub async fn withdraw(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError> {
        let balance = self.db.debit(player, amount).await?;
        info!("🗃️ {player} withdrew {amount}");
        Ok(balance)
    }

    pub async fn journal_for_game(&self, game_id: GameId) -> Result<Vec<JournalEntry>, LedgerError> {
        self.db.fetch_journal_for_game(game_id).await
    }

    pub async fn bot_pool(&self) -> Result<BotPool, BotPoolError> {
        self.db.fetch_bot_pool().await
    }

    pub async fn fund_bot_pool(&self, amount: Coins) -> Result<BotPool, BotPoolError> {
        self.db.fund_bot_pool(amount).await
    }

    /// The largest stake the bot can currently cover: the configured cap, or whatever the pool has left if that is
    /// less.
    pub async fn available_for_bot(&self) -> Result<Coins, BotPoolError> {
        let pool = self.db.fetch_bot_pool().await?;
        Ok(pool.available_for_bot(self.config.bot_cap))
    }
}
