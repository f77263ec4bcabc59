use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    config::WagerConfig,
    db_types::{PlayerId, Tournament, TournamentId, TournamentParticipant},
    events::{EventProducers, Notification},
    rps_api::game_objects::LeaderboardEntry,
    traits::{TournamentError, TournamentManagement},
};

const LEADERBOARD_SIZE: i64 = 10;

/// Tournament administration and the leaderboard.
///
/// Standings are written by game settlement, never through this API. A win is worth 3 points, a draw 1 and a loss
/// nothing. Ties on points go to whoever joined the tournament first.
pub struct TournamentApi<B> {
    db: B,
    config: WagerConfig,
    producers: EventProducers,
}

impl<B: Debug> Debug for TournamentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TournamentApi ({:?})", self.db)
    }
}

impl<B> TournamentApi<B> {
    pub fn new(db: B, config: WagerConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> TournamentApi<B>
where B: TournamentManagement
{
    /// Opens a new tournament starting now. Only one tournament may be active at a time.
    pub async fn start_tournament(&self, end_date: Option<DateTime<Utc>>) -> Result<Tournament, TournamentError> {
        let tournament = self.db.insert_tournament(Utc::now(), end_date).await?;
        info!("🏆 {} has started", tournament.id);
        Ok(tournament)
    }

    pub async fn active_tournament(&self) -> Result<Option<Tournament>, TournamentError> {
        self.db.fetch_active_tournament().await
    }

    pub async fn top_10(&self, id: TournamentId) -> Result<Vec<LeaderboardEntry>, TournamentError> {
        let participants = self.db.fetch_top_participants(id, LEADERBOARD_SIZE).await?;
        let board = participants.iter().zip(1..).map(|(p, rank)| LeaderboardEntry::new(rank, p)).collect();
        Ok(board)
    }

    /// The player's 1-based position on the leaderboard, or `None` if they have not played in the tournament.
    pub async fn rank(&self, id: TournamentId, player: PlayerId) -> Result<Option<i64>, TournamentError> {
        self.db.fetch_rank(id, player).await
    }

    pub async fn participant(
        &self,
        id: TournamentId,
        player: PlayerId,
    ) -> Result<Option<TournamentParticipant>, TournamentError> {
        self.db.fetch_participant(id, player).await
    }

    /// Closes an active tournament ahead of its end date.
    pub async fn complete_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let tournament = self.db.complete_tournament(id).await?;
        info!("🏆 {id} has been completed");
        self.producers.publish_tournament_completed(&tournament).await;
        Ok(tournament)
    }

    /// Completes every active tournament whose end date has passed.
    pub async fn complete_finished_tournaments(&self) -> Result<Vec<Tournament>, TournamentError> {
        let completed = self.db.complete_expired_tournaments(Utc::now()).await?;
        for t in &completed {
            info!("🏆 {} reached its end date and has been completed. Counting results.", t.id);
            self.producers.publish_tournament_completed(t).await;
        }
        Ok(completed)
    }

    /// Pays the configured rewards to the top of the leaderboard and marks the tournament as rewarded.
    ///
    /// Each participant is paid at most once, and running this again on a rewarded tournament does nothing.
    pub async fn distribute_rewards(&self, id: TournamentId) -> Result<Vec<TournamentParticipant>, TournamentError> {
        let rewarded = self.db.reward_top_participants(id, &self.config.tournament_rewards, Utc::now()).await?;
        for p in &rewarded {
            let message = format!("Congratulations! You earned {} in {id}.", p.reward_amount);
            self.producers.notify(Notification::new(p.player_id, message)).await;
        }
        Ok(rewarded)
    }
}
