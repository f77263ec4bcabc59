use std::{fmt::Debug, str::FromStr};

use chrono::Utc;
use log::*;
use rand::thread_rng;

use crate::{
    config::WagerConfig,
    db_types::{Game, GameId, Move, PlayerId},
    events::{EventProducers, GameSettledEvent},
    game_machine::{pending_resolution, CancelReason},
    rps_api::game_objects::{settlement_notifications, GameView, MoveReceipt, RecentGame, SweepResult, TopPlayer},
    traits::{GameFlowError, GameManagement, MatchmakingManagement, MoveOutcome, MoveSubmission, SettledGame},
};

const TOP_PLAYERS: i64 = 5;

/// `GameFlowApi` drives games from the first move to settlement.
///
/// Events and notifications are only published once the settlement they describe has been committed.
pub struct GameFlowApi<B> {
    db: B,
    config: WagerConfig,
    producers: EventProducers,
}

impl<B: Debug> Debug for GameFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GameFlowApi ({:?})", self.db)
    }
}

impl<B> GameFlowApi<B> {
    pub fn new(db: B, config: WagerConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> GameFlowApi<B>
where B: GameManagement
{
    /// Records `mv` for `player` and settles the game if that completes it.
    ///
    /// `mv` is parsed before anything else happens, so an illegal move never touches the database. If the game has
    /// expired, it is resolved as a timeout and [`GameFlowError::GameExpired`] is returned.
    pub async fn submit_move(&self, player: PlayerId, game_id: GameId, mv: &str) -> Result<MoveReceipt, GameFlowError> {
        let mv = Move::from_str(mv).map_err(|e| GameFlowError::InvalidMove(e.to_string()))?;
        let bot_reply = self.config.bot_strategy().reply_to(mv, &mut thread_rng());
        let submission =
            MoveSubmission { game_id, player, mv, bot_reply, move_timeout: self.config.move_timeout, now: Utc::now() };
        match self.db.submit_move(submission).await? {
            MoveOutcome::Waiting(game) => {
                debug!("⚖️ {player} played {mv} in {game_id}. Waiting for the opponent.");
                Ok(MoveReceipt::waiting(&game))
            },
            MoveOutcome::Settled(settled) => {
                let receipt = MoveReceipt::settled(&settled.game, &settled.plan, player);
                debug!("⚖️ {player} played {mv} and settled {game_id}: {:?}", settled.plan.resolution);
                self.publish_settlement(settled).await;
                Ok(receipt)
            },
            MoveOutcome::Expired(settled) => {
                self.publish_settlement(settled).await;
                Err(GameFlowError::GameExpired(game_id))
            },
        }
    }

    /// The game as `player` sees it.
    ///
    /// An overdue game is resolved before the view is built, so a player polling a game whose opponent has gone quiet
    /// sees the forfeit as soon as the move timer runs out.
    pub async fn game_status(&self, game_id: GameId, player: PlayerId) -> Result<GameView, GameFlowError> {
        let mut game = self.fetch_game(game_id).await?;
        if game.side_of(player).is_none() {
            return Err(GameFlowError::NotParticipant { game_id, player });
        }
        let now = Utc::now();
        if pending_resolution(&game, now, self.config.move_timeout).is_some() {
            match self.db.resolve_if_due(game_id, now, self.config.move_timeout).await? {
                Some(settled) => {
                    game = settled.game.clone();
                    self.publish_settlement(settled).await;
                },
                None => game = self.fetch_game(game_id).await?,
            }
        }
        GameView::for_player(&game, player).ok_or(GameFlowError::NotParticipant { game_id, player })
    }

    /// A participant abandons an active game. Every stake is refunded.
    pub async fn cancel_game(&self, player: PlayerId, game_id: GameId) -> Result<SettledGame, GameFlowError> {
        let settled = self.db.cancel_game(game_id, CancelReason::Requested(player), Utc::now()).await?;
        self.publish_settlement(settled.clone()).await;
        Ok(settled)
    }

    /// Cancels any active game with full refunds, regardless of who is playing.
    pub async fn admin_cancel_game(&self, game_id: GameId) -> Result<SettledGame, GameFlowError> {
        let settled = self.db.cancel_game(game_id, CancelReason::Administrative, Utc::now()).await?;
        warn!("⚖️ {game_id} was cancelled by an administrator");
        self.publish_settlement(settled.clone()).await;
        Ok(settled)
    }

    /// The player's finished and cancelled games, newest first.
    pub async fn recent_games(&self, player: PlayerId, limit: i64) -> Result<Vec<RecentGame>, GameFlowError> {
        let games = self.db.fetch_recent_games(player, limit).await?;
        Ok(games.iter().filter_map(|g| RecentGame::for_player(g, player)).collect())
    }

    /// The five best players across every finished game, by wins and then by games played.
    pub async fn top_players(&self) -> Result<Vec<TopPlayer>, GameFlowError> {
        let stats = self.db.fetch_top_players(TOP_PLAYERS).await?;
        Ok(stats.iter().zip(1..).map(|(s, rank)| TopPlayer::new(rank, s)).collect())
    }

    async fn fetch_game(&self, game_id: GameId) -> Result<Game, GameFlowError> {
        self.db.fetch_game(game_id).await?.ok_or(GameFlowError::GameNotFound(game_id))
    }

    async fn publish_settlement(&self, settled: SettledGame) {
        let SettledGame { game, plan } = settled;
        for notification in settlement_notifications(&game, &plan) {
            self.producers.notify(notification).await;
        }
        self.producers.publish_game_settled(&GameSettledEvent::new(game, plan)).await;
    }
}

impl<B> GameFlowApi<B>
where B: GameManagement + MatchmakingManagement
{
    /// Resolves every overdue game and evicts stale queue entries.
    ///
    /// This is safe to run while players are moving. Each game is resolved under its lock, so a game that a move
    /// settles first is simply skipped.
    pub async fn sweep(&self) -> Result<SweepResult, GameFlowError> {
        let now = Utc::now();
        let mut result = SweepResult::default();
        let overdue = self.db.fetch_overdue_game_ids(now, self.config.move_timeout).await?;
        trace!("🕰️ {} overdue games found", overdue.len());
        for game_id in overdue {
            match self.db.resolve_if_due(game_id, now, self.config.move_timeout).await {
                Ok(Some(settled)) => {
                    if settled.plan.is_cancellation() {
                        result.cancelled.push(game_id);
                    } else {
                        result.finished.push(game_id);
                    }
                    self.publish_settlement(settled).await;
                },
                Ok(None) => trace!("🕰️ {game_id} was resolved by someone else first"),
                Err(e) => {
                    error!("🕰️ Could not resolve {game_id}. {e}");
                    result.failed.push(game_id);
                },
            }
        }
        result.evicted = self
            .db
            .evict_expired_queue_entries(now)
            .await
            .map_err(|e| GameFlowError::DatabaseError(e.to_string()))?;
        Ok(result)
    }
}
