use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Coins, PlayerId, Tournament, TournamentId, TournamentParticipant, TournamentStatus};

#[derive(Debug, Clone, Error)]
pub enum TournamentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Tournament {0} does not exist")]
    TournamentNotFound(TournamentId),
    #[error("{0} is still active")]
    TournamentAlreadyActive(TournamentId),
    #[error("{id} is {status}, so this cannot be done")]
    InvalidStatus { id: TournamentId, status: TournamentStatus },
}

impl From<sqlx::Error> for TournamentError {
    fn from(e: sqlx::Error) -> Self {
        TournamentError::DatabaseError(e.to_string())
    }
}

/// Tournament records and standings.
///
/// Points are accrued by the settlement path ([`crate::traits::GameManagement`]); this trait covers everything else.
#[allow(async_fn_in_trait)]
pub trait TournamentManagement {
    /// Creates a new active tournament. Checking for an already active tournament and creating the new one are a
    /// single atomic unit, so concurrent callers can never open two. If one is already active, nothing is written and
    /// [`TournamentError::TournamentAlreadyActive`] is returned.
    async fn insert_tournament(
        &self,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Tournament, TournamentError>;

    async fn fetch_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, TournamentError>;

    /// The most recently started active tournament, if any.
    async fn fetch_active_tournament(&self) -> Result<Option<Tournament>, TournamentError>;

    /// Participants ordered by points, ties going to whoever joined the tournament first.
    async fn fetch_top_participants(
        &self,
        id: TournamentId,
        limit: i64,
    ) -> Result<Vec<TournamentParticipant>, TournamentError>;

    async fn fetch_participant(
        &self,
        id: TournamentId,
        player: PlayerId,
    ) -> Result<Option<TournamentParticipant>, TournamentError>;

    /// The player's 1-based position in the standings, or `None` if they have not played in the tournament.
    async fn fetch_rank(&self, id: TournamentId, player: PlayerId) -> Result<Option<i64>, TournamentError>;

    /// Moves an active tournament to `Completed`.
    async fn complete_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError>;

    /// Completes every active tournament whose end date is at or before `now`.
    async fn complete_expired_tournaments(&self, now: DateTime<Utc>) -> Result<Vec<Tournament>, TournamentError>;

    /// Pays `rewards[i]` to the participant ranked `i + 1` in a completed tournament, zeroes their points and marks the
    /// tournament `Rewarded`. Participants that were already rewarded are skipped, and a tournament that has already
    /// been rewarded is left alone. Returns the participants that were paid by this call.
    async fn reward_top_participants(
        &self,
        id: TournamentId,
        rewards: &[Coins],
        now: DateTime<Utc>,
    ) -> Result<Vec<TournamentParticipant>, TournamentError>;
}
