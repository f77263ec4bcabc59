//! SQLite backend for the wagering engine.
//!
//! SQLite has no row level locks. Instead, every mutating unit of work runs in a single transaction whose first
//! statement writes to the row being contended for (the game, the bot pool, the player's queue entry, and so on).
//! That first write takes the database write lock, which is then held until the transaction commits or rolls back.
//! All mutating units are therefore serialised, and everything a unit reads after its first write is guaranteed not to
//! change underneath it. Contenders wait on the busy timeout configured in [`db::new_pool`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
