use crate::database::models::{
    DbError, LeaderboardEntry, Play, PlayRecord, PlayUpdate, Player,
};
use crate::database::query;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// Handle to the scores database. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens or creates the database file.
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let absolute_path = if db_path.is_absolute() {
            db_path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(db_path)
        };

        let options = SqliteConnectOptions::new()
            .filename(&absolute_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;
        let db = Database { pool };
        db.init_schema().await?;
        log::info!("DB: Opened {:?}", absolute_path);
        Ok(db)
    }

    /// Private in-memory database, used by tests and throwaway runs.
    pub async fn in_memory() -> Result<Self, DbError> {
        // Every new connection to :memory: gets its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Database { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Creates the tables if they do not exist.
    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS player (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        // No foreign key: plays of a deleted player stay on the leaderboard.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS plays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                played_at TEXT NOT NULL,
                music_name TEXT NOT NULL,
                score INTEGER NOT NULL CHECK (score >= 0),
                player_id INTEGER NOT NULL,
                errors INTEGER NOT NULL DEFAULT 0,
                perfect_hits INTEGER NOT NULL DEFAULT 0,
                good_hits INTEGER NOT NULL DEFAULT 0,
                bad_hits INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plays_music ON plays(music_name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_player(&self, name: &str) -> Result<i64, DbError> {
        query::create_player(&self.pool, name).await
    }

    pub async fn get_player(&self, id: i64) -> Result<Option<Player>, DbError> {
        query::get_player(&self.pool, id).await
    }

    pub async fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, DbError> {
        query::get_player_by_name(&self.pool, name).await
    }

    pub async fn all_players(&self) -> Result<Vec<Player>, DbError> {
        query::all_players(&self.pool).await
    }

    pub async fn rename_player(&self, id: i64, name: &str) -> Result<u64, DbError> {
        query::rename_player(&self.pool, id, name).await
    }

    pub async fn delete_player(&self, id: i64) -> Result<u64, DbError> {
        query::delete_player(&self.pool, id).await
    }

    /// Returns the player with this name, creating it on first use.
    pub async fn ensure_player(&self, name: &str) -> Result<Player, DbError> {
        query::ensure_player(&self.pool, name).await
    }

    pub async fn insert_play(&self, play: &PlayRecord) -> Result<i64, DbError> {
        query::insert_play(&self.pool, play).await
    }

    pub async fn get_play(&self, id: i64) -> Result<Option<Play>, DbError> {
        query::get_play(&self.pool, id).await
    }

    pub async fn all_plays(&self) -> Result<Vec<Play>, DbError> {
        query::all_plays(&self.pool).await
    }

    pub async fn update_play(&self, id: i64, update: &PlayUpdate) -> Result<u64, DbError> {
        query::update_play(&self.pool, id, update).await
    }

    pub async fn update_play_score(&self, id: i64, score: i64) -> Result<u64, DbError> {
        query::update_play_score(&self.pool, id, score).await
    }

    pub async fn delete_play(&self, id: i64) -> Result<u64, DbError> {
        query::delete_play(&self.pool, id).await
    }

    pub async fn plays_for_player(&self, player_id: i64) -> Result<Vec<Play>, DbError> {
        query::plays_for_player(&self.pool, player_id).await
    }

    pub async fn latest_plays(&self, limit: i64) -> Result<Vec<Play>, DbError> {
        query::latest_plays(&self.pool, limit).await
    }

    pub async fn leaderboard_for_music(
        &self,
        music_name: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        query::leaderboard_for_music(&self.pool, music_name, limit).await
    }

    pub async fn best_for_player_and_music(
        &self,
        player_id: i64,
        music_name: &str,
    ) -> Result<Option<LeaderboardEntry>, DbError> {
        query::best_for_player_and_music(&self.pool, player_id, music_name).await
    }
}
