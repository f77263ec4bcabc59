use std::fmt::Debug;

use chrono::Utc;
use log::*;
use rand::thread_rng;

use crate::{
    config::WagerConfig,
    db_types::{Coins, Game, GameId, NewQueueEntry, PlayerId, QueueEntry, TournamentId},
    events::{EventProducers, Notification},
    helpers::random_bot_label,
    traits::{
        BotConnection,
        BotRequest,
        MatchStatus,
        MatchmakingError,
        MatchmakingManagement,
        RematchRequest,
        TournamentManagement,
    },
};

/// `MatchmakingApi` answers "find me an opponent" and "connect me to a bot".
///
/// Clients poll [`Self::request_match`] while they wait. Each poll refreshes the player's queue entry, so an entry
/// disappears a few seconds after the client stops polling. When the client gives up on finding a human, it calls
/// [`Self::connect_bot`].
pub struct MatchmakingApi<B> {
    db: B,
    config: WagerConfig,
    producers: EventProducers,
}

impl<B: Debug> Debug for MatchmakingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchmakingApi ({:?})", self.db)
    }
}

impl<B> MatchmakingApi<B> {
    pub fn new(db: B, config: WagerConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn config(&self) -> &WagerConfig {
        &self.config
    }
}

impl<B> MatchmakingApi<B>
where B: MatchmakingManagement + TournamentManagement
{
    /// Enqueues the player at `stake` and tries to pair them with the longest-waiting compatible player.
    ///
    /// If the player is already in an active game, that game is returned and nothing else happens, which makes client
    /// retries harmless.
    pub async fn request_match(&self, player: PlayerId, stake: Coins) -> Result<MatchStatus, MatchmakingError> {
        self.check_stake(stake)?;
        let tournament_id = self.active_tournament_id().await?;
        let entry = NewQueueEntry::new(player, stake, Utc::now(), self.config.queue_ttl).with_tournament(tournament_id);
        let status = self.db.request_match(entry, self.config.game_expiry).await?;
        match &status {
            MatchStatus::Matched(game) => {
                debug!("🎮 {player} was matched in {}", game.id);
                self.announce_pvp_game(game).await;
            },
            MatchStatus::AlreadyPlaying(game) => trace!("🎮 {player} asked for a match while playing in {}", game.id),
            MatchStatus::Searching(_) => trace!("🎮 {player} is waiting for an opponent at {stake}"),
        }
        Ok(status)
    }

    /// Abandons the search. Returns `true` if the player was in the queue.
    pub async fn cancel_search(&self, player: PlayerId) -> Result<bool, MatchmakingError> {
        let evicted = self.db.evict_queue_entry(player).await?;
        if evicted {
            debug!("🎮 {player} stopped searching for an opponent");
        }
        Ok(evicted)
    }

    /// Starts a game against the house bot.
    ///
    /// A human who turned up in the queue, or a game the player is already in, takes precedence. If the bot pool
    /// cannot back the stake, [`BotConnection::Unavailable`] is returned and the player's queue entry is left alone so
    /// that they can keep searching.
    pub async fn connect_bot(&self, player: PlayerId, stake: Coins) -> Result<BotConnection, MatchmakingError> {
        self.check_stake(stake)?;
        let tournament_id = self.active_tournament_id().await?;
        let bot_label = random_bot_label(&mut thread_rng());
        let request = BotRequest {
            player,
            stake,
            tournament_id,
            bot_label,
            bot_cap: self.config.bot_cap,
            game_lifetime: self.config.game_expiry,
            now: Utc::now(),
        };
        let connection = self.db.connect_bot(request).await?;
        match &connection {
            BotConnection::Connected(game) => {
                self.producers.publish_game_started(game).await;
                let label = game.bot_label.as_deref().unwrap_or_default();
                let message = format!("You are playing {label} for {stake}. Make your move!");
                self.producers.notify(Notification::new(player, message)).await;
            },
            BotConnection::MatchedHuman(game) => {
                info!("🤖 {player} found a human opponent while connecting to a bot");
                self.announce_pvp_game(game).await;
            },
            BotConnection::AlreadyPlaying(_) => {},
            BotConnection::Unavailable => {
                info!("🤖 No bot is available for {player} at {stake}");
                self.producers.notify(Notification::new(player, "No opponent is available right now. Try again.")).await;
            },
        }
        Ok(connection)
    }

    /// Starts a new game against the opponent of `game_id`, at the same stake.
    ///
    /// Bot games are replayed against the same bot. The new game joins the tournament that is active now, which is not
    /// necessarily the one the earlier game counted towards.
    pub async fn rematch(&self, player: PlayerId, game_id: GameId) -> Result<Game, MatchmakingError> {
        let tournament_id = self.active_tournament_id().await?;
        let request = RematchRequest {
            player,
            game_id,
            tournament_id,
            fallback_bot_label: random_bot_label(&mut thread_rng()),
            bot_cap: self.config.bot_cap,
            game_lifetime: self.config.game_expiry,
            now: Utc::now(),
        };
        let game = self.db.rematch(request).await?;
        if game.is_bot_game {
            self.producers.publish_game_started(&game).await;
            let label = game.bot_label.as_deref().unwrap_or_default();
            let message = format!("{label} accepted your rematch for {}. Make your move!", game.stake);
            self.producers.notify(Notification::new(player, message)).await;
        } else {
            self.announce_pvp_game(&game).await;
        }
        Ok(game)
    }

    pub async fn queue_entry(&self, player: PlayerId) -> Result<Option<QueueEntry>, MatchmakingError> {
        self.db.fetch_queue_entry(player).await
    }

    /// Removes every queue entry whose owner has stopped polling.
    pub async fn evict_expired_entries(&self) -> Result<u64, MatchmakingError> {
        let count = self.db.evict_expired_queue_entries(Utc::now()).await?;
        if count > 0 {
            debug!("🎮 {count} stale queue entries evicted");
        }
        Ok(count)
    }

    fn check_stake(&self, stake: Coins) -> Result<(), MatchmakingError> {
        if self.config.check_stake(stake) {
            Ok(())
        } else {
            debug!("🎮 {stake} is not an allowed stake");
            Err(MatchmakingError::InvalidStake(stake))
        }
    }

    async fn active_tournament_id(&self) -> Result<Option<TournamentId>, MatchmakingError> {
        let tournament = self
            .db
            .fetch_active_tournament()
            .await
            .map_err(|e| MatchmakingError::DatabaseError(e.to_string()))?;
        Ok(tournament.map(|t| t.id))
    }

    async fn announce_pvp_game(&self, game: &Game) {
        self.producers.publish_game_started(game).await;
        for player in game.players() {
            let message = format!("Opponent found! {} is on for {}. Make your move!", game.id, game.stake);
            self.producers.notify(Notification::new(player, message)).await;
        }
    }
}
