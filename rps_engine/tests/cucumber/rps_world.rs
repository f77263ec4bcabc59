use std::collections::HashMap;

use cucumber::World;
use log::*;
use rps_engine::{
    db_types::{Game, GameId, PlayerId},
    events::EventProducers,
    game_objects::{MoveReceipt, SweepResult},
    traits::{BotConnection, GameFlowError, MatchStatus, MatchmakingError},
    GameFlowApi,
    GameManagement,
    LedgerApi,
    MatchmakingApi,
    SqliteDatabase,
    TournamentApi,
    WagerConfig,
};

use crate::support::prepare_env::{prepare_test_env, random_db_path};

#[derive(Default, Debug, World)]
pub struct RpsWorld {
    pub system: Option<WagerSystem>,
    pub players: HashMap<String, PlayerId>,
    pub current_game: Option<GameId>,
    pub last_match: Option<Result<MatchStatus, MatchmakingError>>,
    pub last_bot: Option<Result<BotConnection, MatchmakingError>>,
    pub last_move: Option<Result<MoveReceipt, GameFlowError>>,
    pub last_error: Option<String>,
    pub last_sweep: Option<SweepResult>,
    pub last_rematch: Option<Result<Game, MatchmakingError>>,
    /// The game a rematch was asked for.
    pub previous_game: Option<GameId>,
}

#[derive(Debug)]
pub struct WagerSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub config: WagerConfig,
}

impl WagerSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path, 5).await;
        debug!("🚀️ Created database: {db_path}");
        Self { db_path, db, config: WagerConfig::default() }
    }

    pub fn matchmaking(&self) -> MatchmakingApi<SqliteDatabase> {
        MatchmakingApi::new(self.db.clone(), self.config.clone(), EventProducers::default())
    }

    pub fn games(&self) -> GameFlowApi<SqliteDatabase> {
        GameFlowApi::new(self.db.clone(), self.config.clone(), EventProducers::default())
    }

    pub fn tournaments(&self) -> TournamentApi<SqliteDatabase> {
        TournamentApi::new(self.db.clone(), self.config.clone(), EventProducers::default())
    }

    pub fn ledger(&self) -> LedgerApi<SqliteDatabase> {
        LedgerApi::new(self.db.clone(), self.config.clone())
    }
}

impl RpsWorld {
    pub fn system(&self) -> &WagerSystem {
        self.system.as_ref().expect("The system has not been initialised")
    }

    pub fn system_mut(&mut self) -> &mut WagerSystem {
        self.system.as_mut().expect("The system has not been initialised")
    }

    /// Players are numbered in the order in which scenarios first mention them.
    pub fn player(&mut self, name: &str) -> PlayerId {
        let next = PlayerId(self.players.len() as i64 + 1);
        *self.players.entry(name.to_string()).or_insert(next)
    }

    pub fn game_id(&self) -> GameId {
        self.current_game.expect("No game has been started in this scenario")
    }

    pub async fn game(&self) -> Game {
        let id = self.game_id();
        self.system().db.fetch_game(id).await.expect("Error fetching game").expect("Game does not exist")
    }

    pub fn track_game(&mut self, game: Option<&Game>) {
        if let Some(game) = game {
            self.current_game = Some(game.id);
        }
    }
}
