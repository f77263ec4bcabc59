use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{Coins, PlayerId};

pub(crate) async fn balance(player: PlayerId, conn: &mut SqliteConnection) -> Result<Coins, sqlx::Error> {
    let balance: Option<Coins> = sqlx::query_scalar("SELECT balance FROM player_balances WHERE player_id = $1")
        .bind(player)
        .fetch_optional(conn)
        .await?;
    Ok(balance.unwrap_or_default())
}

/// Adds `amount` to the player's balance, creating the row if it does not exist yet. Returns the new balance.
pub(crate) async fn credit(
    player: PlayerId,
    amount: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Coins, sqlx::Error> {
    sqlx::query_scalar(
        r#"
    INSERT INTO player_balances (player_id, balance, created_at, updated_at) VALUES ($1, $2, $3, $3)
    ON CONFLICT (player_id) DO UPDATE SET balance = balance + excluded.balance, updated_at = excluded.updated_at
    RETURNING balance
    "#,
    )
    .bind(player)
    .bind(amount)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Removes `amount` from the player's balance in a single conditional statement. Returns the new balance, or `None`
/// (and changes nothing) if the player cannot cover the amount.
pub(crate) async fn debit(
    player: PlayerId,
    amount: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Coins>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
    UPDATE player_balances SET balance = balance - $2, updated_at = $3
    WHERE player_id = $1 AND balance >= $2
    RETURNING balance
    "#,
    )
    .bind(player)
    .bind(amount)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub(crate) async fn total(conn: &mut SqliteConnection) -> Result<Coins, sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0) FROM player_balances").fetch_one(conn).await?;
    Ok(Coins::from(total))
}
