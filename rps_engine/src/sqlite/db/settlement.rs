use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqliteConnection;

use super::{balances, bot_pool, games, journal, tournaments};
use crate::{
    db_types::{Game, JournalEntryType, NewJournalEntry},
    game_machine::{Resolution, SettlementPlan},
    traits::{GameFlowError, SettledGame},
};

/// Applies `resolution` to a game that the current transaction holds the lock for.
///
/// Credits, the bot pool release, the journal, tournament standings and the terminal status are all written on `conn`,
/// so they commit or roll back together with the caller's transaction. Tournament points only accrue if the game's
/// tournament is still active at this moment.
pub(crate) async fn settle_locked_game(
    game: &Game,
    resolution: Resolution,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<SettledGame, GameFlowError> {
    if game.is_terminal() {
        return Err(GameFlowError::AlreadyTerminal { game_id: game.id, status: game.status });
    }
    let plan = SettlementPlan::for_game(game, resolution);
    for credit in &plan.credits {
        balances::credit(credit.player, credit.amount, now, conn).await?;
        let entry = NewJournalEntry::player(credit.player, credit.entry_type, credit.amount).for_game(game.id);
        journal::insert_entry(entry, now, conn).await?;
    }
    if plan.pool_release.is_positive() {
        bot_pool::release(plan.pool_release, now, conn).await?;
        let entry = NewJournalEntry::bot_pool(JournalEntryType::BotRelease, plan.pool_release).for_game(game.id);
        journal::insert_entry(entry, now, conn).await?;
    }
    if plan.house_take.is_positive() {
        let entry = NewJournalEntry::player(game.player1_id, JournalEntryType::HouseTake, plan.house_take).for_game(game.id);
        journal::insert_entry(entry, now, conn).await?;
    }
    if let Some(tournament_id) = game.tournament_id {
        match tournaments::fetch_tournament(tournament_id, conn).await? {
            Some(t) if t.is_active() => {
                for (player, standing) in &plan.standings {
                    tournaments::record_standing(tournament_id, *player, *standing, now, conn).await?;
                }
            },
            _ => debug!("⚖️ {tournament_id} is no longer active. {} does not count towards it.", game.id),
        }
    }
    let game = games::finalize_game(game.id, &plan, now, conn)
        .await?
        .ok_or(GameFlowError::AlreadyTerminal { game_id: game.id, status: game.status })?;
    debug!("⚖️ {} settled as {:?}. {} credited in total", game.id, plan.resolution, plan.total_credited());
    Ok(SettledGame { game, plan })
}
