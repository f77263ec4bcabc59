use std::time::Duration;

use log::*;
use tokio::task::JoinHandle;

use crate::{
    config::WagerConfig,
    events::EventProducers,
    rps_api::{game_flow_api::GameFlowApi, game_objects::SweepResult, tournament_api::TournamentApi},
    SqliteDatabase,
};

/// Starts the expiry worker, which sweeps overdue games and stale queue entries every `period`, and completes
/// tournaments that have reached their end date.
///
/// Do not await the returned JoinHandle, as it will run indefinitely. Abort it to stop the worker.
pub fn start_expiry_worker(
    db: SqliteDatabase,
    config: WagerConfig,
    producers: EventProducers,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let games = GameFlowApi::new(db.clone(), config.clone(), producers.clone());
        let tournaments = TournamentApi::new(db, config, producers);
        info!("🕰️ Expiry worker started. Sweeping every {}ms", period.as_millis());
        loop {
            timer.tick().await;
            trace!("🕰️ Running game expiry sweep");
            match games.sweep().await {
                Ok(result) => log_sweep(&result),
                Err(e) => error!("🕰️ Error running the game expiry sweep: {e}"),
            }
            if let Err(e) = tournaments.complete_finished_tournaments().await {
                error!("🕰️ Error completing finished tournaments: {e}");
            }
        }
    })
}

fn log_sweep(result: &SweepResult) {
    if result.resolved_count() > 0 || result.evicted > 0 {
        info!(
            "🕰️ Sweep resolved {} games ({} finished, {} cancelled) and evicted {} queue entries",
            result.resolved_count(),
            result.finished.len(),
            result.cancelled.len(),
            result.evicted
        );
    }
    if !result.failed.is_empty() {
        warn!("🕰️ {} games could not be resolved and will be retried: {:?}", result.failed.len(), result.failed);
    }
}
