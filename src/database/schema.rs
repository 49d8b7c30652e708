//! Database schema migrations

use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// Tables created by [`run_migrations`], in creation order
pub const TABLES: &[&str] = &["users", "songs", "user_likes"];

/// Run database migrations to create/update schema
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    // Users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Songs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'New Release',
            filename TEXT NOT NULL,
            image_filename TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_songs_category ON songs(category);
        CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist);
        "#,
    )
    .execute(pool)
    .await?;

    // Likes junction table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_likes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            song_id INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (song_id) REFERENCES songs(id) ON DELETE CASCADE,
            UNIQUE(user_id, song_id)
        );

        CREATE INDEX IF NOT EXISTS idx_user_likes_user ON user_likes(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
