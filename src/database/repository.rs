//! Database repository - main entry point
//! Delegates to ops modules for actual operations

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;

use super::{models::*, ops, schema};

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create and initialize database at the given path
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Foreign keys must be on for every pooled connection, otherwise
        // likes survive the deletion of their song or user.
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        schema::run_migrations(&pool).await?;

        tracing::debug!(path = %db_path.display(), "Database ready");

        Ok(Self { pool })
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ============ Song Operations ============

    pub async fn insert_song(&self, song: NewSong) -> Result<i64> {
        ops::insert_song(&self.pool, song).await
    }

    pub async fn get_song(&self, id: i64) -> Result<Option<Song>> {
        ops::get_song(&self.pool, id).await
    }

    pub async fn get_all_songs(&self) -> Result<Vec<Song>> {
        ops::get_all_songs(&self.pool).await
    }

    pub async fn get_songs_by_category(&self, category: &str) -> Result<Vec<Song>> {
        ops::get_songs_by_category(&self.pool, category).await
    }

    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>> {
        ops::search_songs(&self.pool, query).await
    }

    pub async fn get_categories(&self) -> Result<Vec<String>> {
        ops::get_categories(&self.pool).await
    }

    pub async fn delete_song(&self, id: i64) -> Result<Option<Song>> {
        ops::delete_song(&self.pool, id).await
    }

    // ============ User Operations ============

    pub async fn create_user(&self, user: NewUser) -> Result<Option<i64>> {
        ops::create_user(&self.pool, user).await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        ops::get_user(&self.pool, id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        ops::get_user_by_email(&self.pool, email).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        ops::verify_credentials(&self.pool, email, password).await
    }

    pub async fn update_user_name(&self, id: i64, name: &str) -> Result<bool> {
        ops::update_user_name(&self.pool, id, name).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        ops::delete_user(&self.pool, id).await
    }

    // ============ Like Operations ============

    pub async fn like_song(&self, user_id: i64, song_id: i64) -> Result<bool> {
        ops::like_song(&self.pool, user_id, song_id).await
    }

    pub async fn unlike_song(&self, user_id: i64, song_id: i64) -> Result<bool> {
        ops::unlike_song(&self.pool, user_id, song_id).await
    }

    pub async fn get_like(&self, user_id: i64, song_id: i64) -> Result<Option<Like>> {
        ops::get_like(&self.pool, user_id, song_id).await
    }

    pub async fn is_liked(&self, user_id: i64, song_id: i64) -> Result<bool> {
        ops::is_liked(&self.pool, user_id, song_id).await
    }

    pub async fn toggle_like(&self, user_id: i64, song_id: i64) -> Result<bool> {
        ops::toggle_like(&self.pool, user_id, song_id).await
    }

    pub async fn get_liked_song_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        ops::get_liked_song_ids(&self.pool, user_id).await
    }

    pub async fn get_liked_songs(&self, user_id: i64) -> Result<Vec<Song>> {
        ops::get_liked_songs(&self.pool, user_id).await
    }
}
