use chrono::{DateTime, Duration, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Game, GameId, NewGame, PlayerId, PlayerStats},
    game_machine::SettlementPlan,
};

/// Creates the game record. The move timer starts at creation.
pub(crate) async fn insert_game(game: NewGame, conn: &mut SqliteConnection) -> Result<Game, sqlx::Error> {
    let is_bot_game = game.is_bot_game();
    let bank = game.bank();
    sqlx::query_as(
        r#"
    INSERT INTO games (
        game_type, status, player1_id, player2_id, is_bot_game, bot_label,
        stake, player1_stake, player2_stake, bank,
        move_timer_start, created_at, updated_at, expires_at, tournament_id
    )
    VALUES ($1, 'Active', $2, $3, $4, $5, $6, $6, $6, $7, $8, $8, $8, $9, $10)
    RETURNING *
    "#,
    )
    .bind(game.game_type)
    .bind(game.player1_id)
    .bind(game.player2_id)
    .bind(is_bot_game)
    .bind(game.bot_label)
    .bind(game.stake)
    .bind(bank)
    .bind(game.created_at)
    .bind(game.expires_at)
    .bind(game.tournament_id)
    .fetch_one(conn)
    .await
}

pub(crate) async fn fetch_game(id: GameId, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM games WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// A no-op write to the game row that returns the game. As the first statement of a transaction, this holds the game
/// (and every other contended row) until the transaction ends.
pub(crate) async fn lock_game(id: GameId, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as("UPDATE games SET status = status WHERE id = $1 RETURNING *").bind(id).fetch_optional(conn).await
}

pub(crate) async fn active_game_for_player(
    player: PlayerId,
    conn: &mut SqliteConnection,
) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as(
        r#"
    SELECT * FROM games
    WHERE status = 'Active' AND (player1_id = $1 OR player2_id = $1)
    ORDER BY id
    LIMIT 1
    "#,
    )
    .bind(player)
    .fetch_optional(conn)
    .await
}

/// Writes both move slots of the game snapshot back to the database.
pub(crate) async fn save_moves(game: &Game, now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Game, sqlx::Error> {
    sqlx::query_as(
        r#"
    UPDATE games SET player1_move = $2, player2_move = $3, updated_at = $4
    WHERE id = $1 AND status = 'Active'
    RETURNING *
    "#,
    )
    .bind(game.id)
    .bind(game.player1_move)
    .bind(game.player2_move)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Moves an active game to its terminal state. Returns `None` if the game was not active.
pub(crate) async fn finalize_game(
    id: GameId,
    plan: &SettlementPlan,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as(
        r#"
    UPDATE games SET status = $2, result = $3, winner_id = $4, finished_at = $5, updated_at = $5
    WHERE id = $1 AND status = 'Active'
    RETURNING *
    "#,
    )
    .bind(id)
    .bind(plan.status)
    .bind(plan.result)
    .bind(plan.winner)
    .bind(now)
    .fetch_optional(conn)
    .await
}

/// Active games that expired at or before `now`, plus active games with exactly one move whose move timer started at or
/// before `now - move_timeout`.
pub(crate) async fn overdue_game_ids(
    now: DateTime<Utc>,
    move_timeout: Duration,
    conn: &mut SqliteConnection,
) -> Result<Vec<GameId>, sqlx::Error> {
    let timer_cutoff = now - move_timeout;
    sqlx::query_scalar(
        r#"
    SELECT id FROM games
    WHERE status = 'Active' AND (
        julianday(expires_at) <= julianday($1)
        OR (
            (player1_move IS NULL) <> (player2_move IS NULL)
            AND julianday(move_timer_start) <= julianday($2)
        )
    )
    ORDER BY id
    "#,
    )
    .bind(now)
    .bind(timer_cutoff)
    .fetch_all(conn)
    .await
}

pub(crate) async fn recent_games(
    player: PlayerId,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Game>, sqlx::Error> {
    sqlx::query_as(
        r#"
    SELECT * FROM games
    WHERE status <> 'Active' AND (player1_id = $1 OR player2_id = $1)
    ORDER BY julianday(finished_at) DESC, id DESC
    LIMIT $2
    "#,
    )
    .bind(player)
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Wins, draws and games played per human player across finished games. A bot win has no winner, so it counts as a
/// loss for the human.
pub(crate) async fn top_players(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<PlayerStats>, sqlx::Error> {
    sqlx::query_as(
        r#"
    WITH sides AS (
        SELECT player1_id AS player_id, winner_id, result FROM games WHERE status = 'Finished'
        UNION ALL
        SELECT player2_id AS player_id, winner_id, result FROM games
        WHERE status = 'Finished' AND player2_id IS NOT NULL
    )
    SELECT
        player_id,
        SUM(CASE WHEN winner_id = player_id THEN 1 ELSE 0 END) AS wins,
        SUM(CASE WHEN result = 'Draw' THEN 1 ELSE 0 END) AS draws,
        COUNT(*) AS total_games
    FROM sides
    GROUP BY player_id
    ORDER BY wins DESC, total_games DESC, player_id ASC
    LIMIT $1
    "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}
