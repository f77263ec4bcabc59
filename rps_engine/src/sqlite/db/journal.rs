use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{GameId, JournalEntry, NewJournalEntry};

pub(crate) async fn insert_entry(
    entry: NewJournalEntry,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
    INSERT INTO ledger_journal (game_id, player_id, entry_type, amount, created_at)
    VALUES ($1, $2, $3, $4, $5)
    "#,
    )
    .bind(entry.game_id)
    .bind(entry.player_id)
    .bind(entry.entry_type)
    .bind(entry.amount)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn entries_for_game(
    game_id: GameId,
    conn: &mut SqliteConnection,
) -> Result<Vec<JournalEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ledger_journal WHERE game_id = $1 ORDER BY id")
        .bind(game_id)
        .fetch_all(conn)
        .await
}
