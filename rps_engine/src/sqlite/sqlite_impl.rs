//! `SqliteDatabase` is a concrete implementation of a wagering engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{balances, bot_pool, db_url, games, journal, new_pool, queue, settlement::settle_locked_game, tournaments};
use crate::{
    db_types::{
        BotPool,
        Coins,
        Game,
        GameId,
        JournalEntry,
        JournalEntryType,
        NewGame,
        NewJournalEntry,
        NewQueueEntry,
        PlayerId,
        PlayerStats,
        QueueEntry,
        Tournament,
        TournamentId,
        TournamentParticipant,
        TournamentStatus,
    },
    game_machine::{self, CancelReason, MoveStep, Resolution},
    traits::{
        BotConnection,
        BotPoolError,
        BotPoolManagement,
        BotRequest,
        GameFlowError,
        GameManagement,
        LedgerError,
        LedgerManagement,
        MatchStatus,
        MatchmakingError,
        MatchmakingManagement,
        MoveOutcome,
        MoveSubmission,
        RematchRequest,
        SettledGame,
        TournamentError,
        TournamentManagement,
        WagerDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database named by `RPS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    /// Connects to the database at `url`, creating the database file if it does not exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connected to {url} with up to {max_connections} connections");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl WagerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn balance(&self, player: PlayerId) -> Result<Coins, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let balance = balances::balance(player, &mut conn).await?;
        Ok(balance)
    }

    async fn credit(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let balance = balances::credit(player, amount, now, &mut tx).await?;
        journal::insert_entry(NewJournalEntry::player(player, JournalEntryType::Deposit, amount), now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {amount} credited to {player}. Their balance is now {balance}");
        Ok(balance)
    }

    async fn debit(&self, player: PlayerId, amount: Coins) -> Result<Coins, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let balance = balances::debit(player, amount, now, &mut tx)
            .await?
            .ok_or(LedgerError::InsufficientFunds { player, required: amount })?;
        journal::insert_entry(NewJournalEntry::player(player, JournalEntryType::Withdrawal, amount), now, &mut tx)
            .await?;
        tx.commit().await?;
        debug!("🗃️ {amount} debited from {player}. Their balance is now {balance}");
        Ok(balance)
    }

    async fn total_player_balances(&self) -> Result<Coins, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let total = balances::total(&mut conn).await?;
        Ok(total)
    }

    async fn fetch_journal_for_game(&self, game_id: GameId) -> Result<Vec<JournalEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let entries = journal::entries_for_game(game_id, &mut conn).await?;
        Ok(entries)
    }
}

impl BotPoolManagement for SqliteDatabase {
    async fn fetch_bot_pool(&self) -> Result<BotPool, BotPoolError> {
        let mut conn = self.pool.acquire().await?;
        bot_pool::fetch_pool(&mut conn).await?.ok_or(BotPoolError::PoolNotInitialised)
    }

    async fn reserve_bot_stake(&self, amount: Coins, bot_cap: Coins) -> Result<bool, BotPoolError> {
        if !amount.is_positive() {
            return Err(BotPoolError::InvalidAmount(amount));
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        if !bot_pool::reserve(amount, bot_cap, now, &mut tx).await? {
            tx.rollback().await?;
            debug!("🤖 The bot pool cannot back {amount} right now");
            return Ok(false);
        }
        journal::insert_entry(NewJournalEntry::bot_pool(JournalEntryType::BotReserve, amount), now, &mut tx).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn release_bot_stake(&self, amount: Coins) -> Result<BotPool, BotPoolError> {
        if !amount.is_positive() {
            return Err(BotPoolError::InvalidAmount(amount));
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let pool = bot_pool::release(amount, now, &mut tx).await?.ok_or(BotPoolError::PoolNotInitialised)?;
        journal::insert_entry(NewJournalEntry::bot_pool(JournalEntryType::BotRelease, amount), now, &mut tx).await?;
        tx.commit().await?;
        Ok(pool)
    }

    async fn fund_bot_pool(&self, amount: Coins) -> Result<BotPool, BotPoolError> {
        if !amount.is_positive() {
            return Err(BotPoolError::InvalidAmount(amount));
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let pool = bot_pool::fund(amount, now, &mut tx).await?.ok_or(BotPoolError::PoolNotInitialised)?;
        journal::insert_entry(NewJournalEntry::bot_pool(JournalEntryType::BotPoolFunding, amount), now, &mut tx)
            .await?;
        tx.commit().await?;
        info!("🤖 The bot pool was funded with {amount}. It now holds {}", pool.total_balance);
        Ok(pool)
    }
}

impl MatchmakingManagement for SqliteDatabase {
    async fn enqueue(&self, entry: NewQueueEntry) -> Result<QueueEntry, MatchmakingError> {
        let mut conn = self.pool.acquire().await?;
        let entry = queue::upsert_entry(&entry, &mut conn).await?;
        Ok(entry)
    }

    async fn fetch_queue_entry(&self, player: PlayerId) -> Result<Option<QueueEntry>, MatchmakingError> {
        let mut conn = self.pool.acquire().await?;
        let entry = queue::fetch_entry(player, &mut conn).await?;
        Ok(entry)
    }

    async fn find_opponent(
        &self,
        player: PlayerId,
        stake: Coins,
        now: DateTime<Utc>,
    ) -> Result<Option<QueueEntry>, MatchmakingError> {
        let mut conn = self.pool.acquire().await?;
        let entry = queue::find_opponent(player, stake, now, &mut conn).await?;
        Ok(entry)
    }

    async fn evict_queue_entry(&self, player: PlayerId) -> Result<bool, MatchmakingError> {
        let mut conn = self.pool.acquire().await?;
        let evicted = queue::delete_entry(player, &mut conn).await?;
        Ok(evicted)
    }

    async fn evict_expired_queue_entries(&self, now: DateTime<Utc>) -> Result<u64, MatchmakingError> {
        let mut conn = self.pool.acquire().await?;
        let count = queue::delete_expired(now, &mut conn).await?;
        Ok(count)
    }

    async fn request_match(
        &self,
        entry: NewQueueEntry,
        game_lifetime: Duration,
    ) -> Result<MatchStatus, MatchmakingError> {
        let player = entry.player_id;
        let stake = entry.stake;
        let now = entry.created_at;
        let mut tx = self.pool.begin().await?;
        // Upserting our own queue entry is the first write, and takes the lock for the whole match attempt.
        let own_entry = queue::upsert_entry(&entry, &mut tx).await?;
        if let Some(game) = games::active_game_for_player(player, &mut tx).await? {
            queue::delete_entry(player, &mut tx).await?;
            tx.commit().await?;
            debug!("🎮 {player} is already playing in {}", game.id);
            return Ok(MatchStatus::AlreadyPlaying(game));
        }
        if balances::balance(player, &mut tx).await? < stake {
            tx.rollback().await?;
            debug!("🎮 {player} cannot cover a stake of {stake}. Not queueing.");
            return Err(MatchmakingError::InsufficientFunds { player, stake });
        }
        let status = match claim_opponent(player, stake, now, &mut tx).await? {
            Some(opponent) => {
                let game = start_pvp_game(&opponent, player, entry.tournament_id, now, game_lifetime, &mut tx).await?;
                MatchStatus::Matched(game)
            },
            None => MatchStatus::Searching(own_entry),
        };
        tx.commit().await?;
        Ok(status)
    }

    async fn connect_bot(&self, request: BotRequest) -> Result<BotConnection, MatchmakingError> {
        let BotRequest { player, stake, tournament_id, bot_label, bot_cap, game_lifetime, now } = request;
        let mut tx = self.pool.begin().await?;
        if bot_pool::lock_pool(&mut tx).await?.is_none() {
            tx.rollback().await?;
            warn!("🤖 The bot pool has not been initialised, so no bot games can be played");
            return Ok(BotConnection::Unavailable);
        }
        if let Some(game) = games::active_game_for_player(player, &mut tx).await? {
            tx.rollback().await?;
            debug!("🤖 {player} is already playing in {}. No bot needed.", game.id);
            return Ok(BotConnection::AlreadyPlaying(game));
        }
        if balances::balance(player, &mut tx).await? < stake {
            tx.rollback().await?;
            return Err(MatchmakingError::InsufficientFunds { player, stake });
        }
        if let Some(opponent) = claim_opponent(player, stake, now, &mut tx).await? {
            let game = start_pvp_game(&opponent, player, tournament_id, now, game_lifetime, &mut tx).await?;
            tx.commit().await?;
            return Ok(BotConnection::MatchedHuman(game));
        }
        if !bot_pool::reserve(stake, bot_cap, now, &mut tx).await? {
            tx.rollback().await?;
            debug!("🤖 The bot pool cannot back a stake of {stake} for {player}");
            return Ok(BotConnection::Unavailable);
        }
        if balances::debit(player, stake, now, &mut tx).await?.is_none() {
            tx.rollback().await?;
            return Err(MatchmakingError::InsufficientFunds { player, stake });
        }
        queue::delete_entry(player, &mut tx).await?;
        let new_game = NewGame::against_bot(player, bot_label, stake, now)
            .with_tournament(tournament_id)
            .expires_after(game_lifetime);
        let game = games::insert_game(new_game, &mut tx).await?;
        journal_escrow(&game, now, &mut tx).await?;
        tx.commit().await?;
        info!("🤖 {player} is playing the bot in {} for {stake}", game.id);
        Ok(BotConnection::Connected(game))
    }

    async fn rematch(&self, request: RematchRequest) -> Result<Game, MatchmakingError> {
        let RematchRequest { player, game_id, tournament_id, fallback_bot_label, bot_cap, game_lifetime, now } = request;
        let mut tx = self.pool.begin().await?;
        let previous = games::lock_game(game_id, &mut tx).await?.ok_or(MatchmakingError::GameNotFound(game_id))?;
        let side = previous.side_of(player).ok_or(MatchmakingError::NotParticipant { game_id, player })?;
        if !previous.is_terminal() {
            return Err(MatchmakingError::GameNotOver(game_id));
        }
        if let Some(game) = games::active_game_for_player(player, &mut tx).await? {
            return Err(MatchmakingError::AlreadyPlaying { player, game_id: game.id });
        }
        let stake = previous.stake;
        let new_game = match previous.player_on(side.other()) {
            Some(opponent) => {
                if games::active_game_for_player(opponent, &mut tx).await?.is_some() {
                    return Err(MatchmakingError::OpponentBusy(opponent));
                }
                if balances::debit(player, stake, now, &mut tx).await?.is_none() {
                    return Err(MatchmakingError::InsufficientFunds { player, stake });
                }
                if balances::debit(opponent, stake, now, &mut tx).await?.is_none() {
                    return Err(MatchmakingError::OpponentCannotCover { opponent, stake });
                }
                queue::delete_entry(opponent, &mut tx).await?;
                NewGame::pvp(player, opponent, stake, now)
            },
            None => {
                if balances::debit(player, stake, now, &mut tx).await?.is_none() {
                    return Err(MatchmakingError::InsufficientFunds { player, stake });
                }
                if !bot_pool::reserve(stake, bot_cap, now, &mut tx).await? {
                    return Err(MatchmakingError::BotUnavailable(stake));
                }
                let label = previous.bot_label.unwrap_or(fallback_bot_label);
                NewGame::against_bot(player, label, stake, now)
            },
        };
        queue::delete_entry(player, &mut tx).await?;
        let new_game = new_game.with_tournament(tournament_id).expires_after(game_lifetime);
        let game = games::insert_game(new_game, &mut tx).await?;
        journal_escrow(&game, now, &mut tx).await?;
        tx.commit().await?;
        info!("🎮 {player} started {} as a rematch of {game_id} for {stake}", game.id);
        Ok(game)
    }
}

impl GameManagement for SqliteDatabase {
    async fn fetch_game(&self, game_id: GameId) -> Result<Option<Game>, GameFlowError> {
        let mut conn = self.pool.acquire().await?;
        let game = games::fetch_game(game_id, &mut conn).await?;
        Ok(game)
    }

    async fn fetch_active_game_for_player(&self, player: PlayerId) -> Result<Option<Game>, GameFlowError> {
        let mut conn = self.pool.acquire().await?;
        let game = games::active_game_for_player(player, &mut conn).await?;
        Ok(game)
    }

    async fn fetch_recent_games(&self, player: PlayerId, limit: i64) -> Result<Vec<Game>, GameFlowError> {
        let mut conn = self.pool.acquire().await?;
        let games = games::recent_games(player, limit, &mut conn).await?;
        Ok(games)
    }

    async fn fetch_top_players(&self, limit: i64) -> Result<Vec<PlayerStats>, GameFlowError> {
        let mut conn = self.pool.acquire().await?;
        let stats = games::top_players(limit, &mut conn).await?;
        Ok(stats)
    }

    async fn submit_move(&self, submission: MoveSubmission) -> Result<MoveOutcome, GameFlowError> {
        let MoveSubmission { game_id, player, mv, bot_reply, move_timeout, now } = submission;
        let mut tx = self.pool.begin().await?;
        let mut game = games::lock_game(game_id, &mut tx).await?.ok_or(GameFlowError::GameNotFound(game_id))?;
        let outcome = match game_machine::accept_move(&mut game, player, mv, bot_reply, now, move_timeout)? {
            MoveStep::Expired(resolution) => {
                debug!("⚖️ {player} moved in {game_id} after it expired");
                MoveOutcome::Expired(settle_locked_game(&game, resolution, now, &mut tx).await?)
            },
            MoveStep::Settle(resolution) => {
                let game = games::save_moves(&game, now, &mut tx).await?;
                MoveOutcome::Settled(settle_locked_game(&game, resolution, now, &mut tx).await?)
            },
            MoveStep::Waiting => MoveOutcome::Waiting(games::save_moves(&game, now, &mut tx).await?),
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn resolve_if_due(
        &self,
        game_id: GameId,
        now: DateTime<Utc>,
        move_timeout: Duration,
    ) -> Result<Option<SettledGame>, GameFlowError> {
        let mut tx = self.pool.begin().await?;
        let game = games::lock_game(game_id, &mut tx).await?.ok_or(GameFlowError::GameNotFound(game_id))?;
        let Some(resolution) = game_machine::pending_resolution(&game, now, move_timeout) else {
            tx.rollback().await?;
            return Ok(None);
        };
        let settled = settle_locked_game(&game, resolution, now, &mut tx).await?;
        tx.commit().await?;
        Ok(Some(settled))
    }

    async fn cancel_game(
        &self,
        game_id: GameId,
        reason: CancelReason,
        now: DateTime<Utc>,
    ) -> Result<SettledGame, GameFlowError> {
        let mut tx = self.pool.begin().await?;
        let game = games::lock_game(game_id, &mut tx).await?.ok_or(GameFlowError::GameNotFound(game_id))?;
        if let CancelReason::Requested(player) = reason {
            if game.side_of(player).is_none() {
                return Err(GameFlowError::NotParticipant { game_id, player });
            }
        }
        let settled = settle_locked_game(&game, Resolution::Cancel(reason), now, &mut tx).await?;
        for player in game.players() {
            queue::delete_entry(player, &mut tx).await?;
        }
        tx.commit().await?;
        info!("⚖️ {game_id} was cancelled ({reason:?}). All stakes have been refunded.");
        Ok(settled)
    }

    async fn fetch_overdue_game_ids(
        &self,
        now: DateTime<Utc>,
        move_timeout: Duration,
    ) -> Result<Vec<GameId>, GameFlowError> {
        let mut conn = self.pool.acquire().await?;
        let ids = games::overdue_game_ids(now, move_timeout, &mut conn).await?;
        Ok(ids)
    }
}

impl TournamentManagement for SqliteDatabase {
    async fn insert_tournament(
        &self,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Tournament, TournamentError> {
        let mut tx = self.pool.begin().await?;
        match tournaments::insert_tournament(start_date, end_date, &mut tx).await? {
            Some(tournament) => {
                tx.commit().await?;
                Ok(tournament)
            },
            None => {
                let active = tournaments::fetch_active_tournament(&mut tx).await?;
                tx.rollback().await?;
                let e = active.map_or_else(
                    || TournamentError::DatabaseError("No tournament was created, but none is active".into()),
                    |t| TournamentError::TournamentAlreadyActive(t.id),
                );
                Err(e)
            },
        }
    }

    async fn fetch_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let tournament = tournaments::fetch_tournament(id, &mut conn).await?;
        Ok(tournament)
    }

    async fn fetch_active_tournament(&self) -> Result<Option<Tournament>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let tournament = tournaments::fetch_active_tournament(&mut conn).await?;
        Ok(tournament)
    }

    async fn fetch_top_participants(
        &self,
        id: TournamentId,
        limit: i64,
    ) -> Result<Vec<TournamentParticipant>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let participants = tournaments::top_participants(id, limit, &mut conn).await?;
        Ok(participants)
    }

    async fn fetch_participant(
        &self,
        id: TournamentId,
        player: PlayerId,
    ) -> Result<Option<TournamentParticipant>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let participant = tournaments::fetch_participant(id, player, &mut conn).await?;
        Ok(participant)
    }

    async fn fetch_rank(&self, id: TournamentId, player: PlayerId) -> Result<Option<i64>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let Some(participant) = tournaments::fetch_participant(id, player, &mut conn).await? else {
            return Ok(None);
        };
        let rank = tournaments::rank_of(&participant, &mut conn).await?;
        Ok(Some(rank))
    }

    async fn complete_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let mut tx = self.pool.begin().await?;
        let tournament =
            tournaments::lock_tournament(id, &mut tx).await?.ok_or(TournamentError::TournamentNotFound(id))?;
        if !tournament.is_active() {
            return Err(TournamentError::InvalidStatus { id, status: tournament.status });
        }
        let tournament = tournaments::update_status(id, TournamentStatus::Completed, None, &mut tx).await?;
        tx.commit().await?;
        Ok(tournament)
    }

    async fn complete_expired_tournaments(&self, now: DateTime<Utc>) -> Result<Vec<Tournament>, TournamentError> {
        let mut conn = self.pool.acquire().await?;
        let completed = tournaments::complete_expired(now, &mut conn).await?;
        Ok(completed)
    }

    async fn reward_top_participants(
        &self,
        id: TournamentId,
        rewards: &[Coins],
        now: DateTime<Utc>,
    ) -> Result<Vec<TournamentParticipant>, TournamentError> {
        let mut tx = self.pool.begin().await?;
        let tournament =
            tournaments::lock_tournament(id, &mut tx).await?.ok_or(TournamentError::TournamentNotFound(id))?;
        match tournament.status {
            TournamentStatus::Active => return Err(TournamentError::InvalidStatus { id, status: tournament.status }),
            TournamentStatus::Rewarded => {
                tx.rollback().await?;
                debug!("🏆 {id} has already been rewarded");
                return Ok(Vec::new());
            },
            TournamentStatus::Completed => {},
        }
        let limit = i64::try_from(rewards.len()).unwrap_or(i64::MAX);
        let ranked = tournaments::top_participants(id, limit, &mut tx).await?;
        let mut rewarded = Vec::with_capacity(ranked.len());
        for (participant, reward) in ranked.into_iter().zip(rewards.iter().copied()) {
            if participant.reward_received || !reward.is_positive() {
                continue;
            }
            balances::credit(participant.player_id, reward, now, &mut tx).await?;
            let entry = NewJournalEntry::player(participant.player_id, JournalEntryType::TournamentReward, reward);
            journal::insert_entry(entry, now, &mut tx).await?;
            let participant = tournaments::mark_rewarded(participant.id, reward, &mut tx).await?;
            debug!("🏆 {} received {reward} from {id}", participant.player_id);
            rewarded.push(participant);
        }
        tournaments::update_status(id, TournamentStatus::Rewarded, Some(now), &mut tx).await?;
        tx.commit().await?;
        info!("🏆 {id} rewards distributed to {} players", rewarded.len());
        Ok(rewarded)
    }
}

/// Claims the oldest compatible queue entry for `player` and escrows its owner's stake.
///
/// Entries whose owner is already playing, or can no longer cover the stake, are evicted and the search continues.
/// Must run inside the caller's transaction.
async fn claim_opponent(
    player: PlayerId,
    stake: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<QueueEntry>, sqlx::Error> {
    loop {
        let Some(candidate) = queue::find_opponent(player, stake, now, conn).await? else {
            return Ok(None);
        };
        let opponent = candidate.player_id;
        if let Some(game) = games::active_game_for_player(opponent, conn).await? {
            warn!("🎮 {opponent} is queued while playing in {}. Evicting the stale queue entry.", game.id);
            queue::delete_entry(opponent, conn).await?;
            continue;
        }
        match balances::debit(opponent, stake, now, conn).await? {
            Some(_) => return Ok(Some(candidate)),
            None => {
                debug!("🎮 {opponent} can no longer cover {stake}. Evicting their queue entry.");
                queue::delete_entry(opponent, conn).await?;
            },
        }
    }
}

/// Escrows `player`'s stake and creates a game against the (already escrowed) owner of `opponent`. Both queue entries
/// are removed. Must run inside the caller's transaction.
async fn start_pvp_game(
    opponent: &QueueEntry,
    player: PlayerId,
    tournament_id: Option<TournamentId>,
    now: DateTime<Utc>,
    game_lifetime: Duration,
    conn: &mut SqliteConnection,
) -> Result<Game, MatchmakingError> {
    let stake = opponent.stake;
    if balances::debit(player, stake, now, conn).await?.is_none() {
        return Err(MatchmakingError::InsufficientFunds { player, stake });
    }
    queue::delete_entry(opponent.player_id, conn).await?;
    queue::delete_entry(player, conn).await?;
    let new_game = NewGame::pvp(opponent.player_id, player, stake, now)
        .with_tournament(tournament_id)
        .expires_after(game_lifetime);
    let game = games::insert_game(new_game, conn).await?;
    journal_escrow(&game, now, conn).await?;
    info!("🎮 {} and {player} matched in {} for {stake} each", opponent.player_id, game.id);
    Ok(game)
}

/// Journals the escrow of a new game: a stake for each human, and the bot's reservation in bot games.
async fn journal_escrow(game: &Game, now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for player in game.players() {
        let entry = NewJournalEntry::player(player, JournalEntryType::Stake, game.stake).for_game(game.id);
        journal::insert_entry(entry, now, conn).await?;
    }
    if game.is_bot_game {
        let entry = NewJournalEntry::bot_pool(JournalEntryType::BotReserve, game.stake).for_game(game.id);
        journal::insert_entry(entry, now, conn).await?;
    }
    Ok(())
}
