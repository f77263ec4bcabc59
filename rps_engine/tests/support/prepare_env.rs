use log::*;
use rps_engine::SqliteDatabase;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, fully migrated database at `url` and returns a connection to it.
pub async fn prepare_test_env(url: &str, max_connections: u32) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, max_connections).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

const TEST_DATA_DIR: &str = "../data";

pub fn random_db_path() -> String {
    format!("sqlite://{TEST_DATA_DIR}/test_rps_{}.db", rand::random::<u64>())
}

pub async fn create_database(url: &str) {
    std::fs::create_dir_all(TEST_DATA_DIR).expect("Error creating the test data directory");
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("🚀️ Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("🚀️ Created Sqlite database {url}");
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = rps_engine::WagerDatabase::url(&db).to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to remove {url}: {e}");
    }
}
