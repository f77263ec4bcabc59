use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{BotPool, Coins};

pub(crate) async fn fetch_pool(conn: &mut SqliteConnection) -> Result<Option<BotPool>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bot_pool WHERE id = 1").fetch_optional(conn).await
}

/// A no-op write to the pool row. As the first statement of a transaction, this serialises the transaction against
/// every other bot pool user.
pub(crate) async fn lock_pool(conn: &mut SqliteConnection) -> Result<Option<BotPool>, sqlx::Error> {
    sqlx::query_as("UPDATE bot_pool SET used_balance = used_balance WHERE id = 1 RETURNING *")
        .fetch_optional(conn)
        .await
}

/// Marks `amount` as used if `amount <= min(bot_cap, total_balance - used_balance)`. Returns `false`, having changed
/// nothing, otherwise.
pub(crate) async fn reserve(
    amount: Coins,
    bot_cap: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
    UPDATE bot_pool SET used_balance = used_balance + $1, updated_at = $3
    WHERE id = 1 AND MIN($2, total_balance - used_balance) >= $1
    "#,
    )
    .bind(amount)
    .bind(bot_cap)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Returns `amount` to the pool. The used balance is floored at zero.
pub(crate) async fn release(
    amount: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<BotPool>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE bot_pool SET used_balance = MAX(0, used_balance - $1), updated_at = $2 WHERE id = 1 RETURNING *",
    )
    .bind(amount)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub(crate) async fn fund(
    amount: Coins,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<BotPool>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE bot_pool SET total_balance = total_balance + $1, updated_at = $2 WHERE id = 1 RETURNING *",
    )
    .bind(amount)
    .bind(now)
    .fetch_optional(conn)
    .await
}
