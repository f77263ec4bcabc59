use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{
    Coins,
    PlayerId,
    Standing,
    Tournament,
    TournamentId,
    TournamentParticipant,
    TournamentStatus,
};

/// Inserts a new active tournament, unless one is already active. Returns `None`, having written nothing, in that case.
pub(crate) async fn insert_tournament(
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as(
        r#"
    INSERT INTO tournaments (status, start_date, end_date, created_at)
    SELECT $1, $2, $3, $4
    WHERE NOT EXISTS (SELECT 1 FROM tournaments WHERE status = 'Active')
    RETURNING *
    "#,
    )
    .bind(TournamentStatus::Active)
    .bind(start_date)
    .bind(end_date)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await
}

pub(crate) async fn fetch_tournament(
    id: TournamentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tournaments WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// See [`crate::sqlite::db::games::lock_game`].
pub(crate) async fn lock_tournament(
    id: TournamentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as("UPDATE tournaments SET status = status WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub(crate) async fn fetch_active_tournament(conn: &mut SqliteConnection) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tournaments WHERE status = 'Active' ORDER BY id DESC LIMIT 1")
        .fetch_optional(conn)
        .await
}

pub(crate) async fn update_status(
    id: TournamentId,
    status: TournamentStatus,
    reward_date: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Tournament, sqlx::Error> {
    sqlx::query_as(
        "UPDATE tournaments SET status = $2, reward_date = COALESCE($3, reward_date) WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(reward_date)
    .fetch_one(conn)
    .await
}

pub(crate) async fn complete_expired(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Tournament>, sqlx::Error> {
    sqlx::query_as(
        r#"
    UPDATE tournaments SET status = 'Completed'
    WHERE status = 'Active' AND end_date IS NOT NULL AND julianday(end_date) <= julianday($1)
    RETURNING *
    "#,
    )
    .bind(now)
    .fetch_all(conn)
    .await
}

/// Adds one settled game to the player's record, creating the participant row on their first game.
pub(crate) async fn record_standing(
    id: TournamentId,
    player: PlayerId,
    standing: Standing,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    let (wins, draws, losses) = match standing {
        Standing::Win => (1, 0, 0),
        Standing::Draw => (0, 1, 0),
        Standing::Loss => (0, 0, 1),
    };
    sqlx::query(
        r#"
    INSERT INTO tournament_participants (tournament_id, player_id, points, games_played, wins, draws, losses, created_at)
    VALUES ($1, $2, $3, 1, $4, $5, $6, $7)
    ON CONFLICT (tournament_id, player_id) DO UPDATE SET
        points = points + excluded.points,
        games_played = games_played + 1,
        wins = wins + excluded.wins,
        draws = draws + excluded.draws,
        losses = losses + excluded.losses
    "#,
    )
    .bind(id)
    .bind(player)
    .bind(standing.points())
    .bind(wins)
    .bind(draws)
    .bind(losses)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn top_participants(
    id: TournamentId,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TournamentParticipant>, sqlx::Error> {
    sqlx::query_as(
        r#"
    SELECT * FROM tournament_participants
    WHERE tournament_id = $1
    ORDER BY points DESC, id ASC
    LIMIT $2
    "#,
    )
    .bind(id)
    .bind(limit)
    .fetch_all(conn)
    .await
}

pub(crate) async fn fetch_participant(
    id: TournamentId,
    player: PlayerId,
    conn: &mut SqliteConnection,
) -> Result<Option<TournamentParticipant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tournament_participants WHERE tournament_id = $1 AND player_id = $2")
        .bind(id)
        .bind(player)
        .fetch_optional(conn)
        .await
}

/// 1 + the number of participants ranked above this one.
pub(crate) async fn rank_of(participant: &TournamentParticipant, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let ahead: i64 = sqlx::query_scalar(
        r#"
    SELECT COUNT(*) FROM tournament_participants
    WHERE tournament_id = $1 AND (points > $2 OR (points = $2 AND id < $3))
    "#,
    )
    .bind(participant.tournament_id)
    .bind(participant.points)
    .bind(participant.id)
    .fetch_one(conn)
    .await?;
    Ok(ahead + 1)
}

pub(crate) async fn mark_rewarded(
    participant_id: i64,
    reward: Coins,
    conn: &mut SqliteConnection,
) -> Result<TournamentParticipant, sqlx::Error> {
    sqlx::query_as(
        r#"
    UPDATE tournament_participants SET reward_received = TRUE, reward_amount = $2, points = 0
    WHERE id = $1
    RETURNING *
    "#,
    )
    .bind(participant_id)
    .bind(reward)
    .fetch_one(conn)
    .await
}
