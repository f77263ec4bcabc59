//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Functions whose name starts with `lock_` are meant to be the first statement of a transaction. See the module
//! documentation of [`crate::sqlite`].
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Error as SqlxError,
    SqlitePool,
};

pub mod balances;
pub mod bot_pool;
pub mod games;
pub mod journal;
pub mod queue;
pub mod settlement;
pub mod tournaments;

const SQLITE_DB_URL: &str = "sqlite://data/rps_wagers.db";
/// How long a transaction waits for the write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

pub fn db_url() -> String {
    let result = env::var("RPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ RPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
