use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{Coins, NewQueueEntry, PlayerId, QueueEntry};

/// Inserts the player's queue entry, or refreshes the stake, tournament and expiry of the existing one.
///
/// A refreshed entry keeps its original `created_at` (and with it, its place in the queue) unless it had already
/// expired, in which case it goes to the back of the queue.
pub(crate) async fn upsert_entry(entry: &NewQueueEntry, conn: &mut SqliteConnection) -> Result<QueueEntry, sqlx::Error> {
    sqlx::query_as(
        r#"
    INSERT INTO match_queue (player_id, stake, tournament_id, created_at, expires_at)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (player_id) DO UPDATE SET
        stake = excluded.stake,
        tournament_id = excluded.tournament_id,
        created_at = CASE
            WHEN julianday(match_queue.expires_at) <= julianday(excluded.created_at) THEN excluded.created_at
            ELSE match_queue.created_at
        END,
        expires_at = excluded.expires_at
    RETURNING *
    "#,
    )
    .bind(entry.player_id)
    .bind(entry.stake)
    .bind(entry.tournament_id)
    .bind(entry.created_at)
    .bind(entry.expires_at)
    .fetch_one(conn)
    .await
}

pub(crate) async fn fetch_entry(player: PlayerId, conn: &mut SqliteConnection) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM match_queue WHERE player_id = $1").bind(player).fetch_optional(conn).await
}

/// The oldest unexpired entry at `stake` belonging to someone other than `player` who can currently cover the stake.
pub(crate) async fn find_opponent(
    player: PlayerId,
    stake: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
    SELECT q.* FROM match_queue q
    JOIN player_balances b ON b.player_id = q.player_id
    WHERE q.stake = $1
      AND q.player_id <> $2
      AND julianday(q.expires_at) > julianday($3)
      AND b.balance >= $1
    ORDER BY julianday(q.created_at), q.id
    LIMIT 1
    "#,
    )
    .bind(stake)
    .bind(player)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub(crate) async fn delete_entry(player: PlayerId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM match_queue WHERE player_id = $1").bind(player).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_expired(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM match_queue WHERE julianday(expires_at) <= julianday($1)")
        .bind(now)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
