//! Like (user ↔ song) operations

use anyhow::Result;
use sqlx::{Pool, Sqlite};

use super::current_timestamp;
use crate::database::{Like, Song};

/// Like a song. Returns false if it was already liked.
pub async fn like_song(pool: &Pool<Sqlite>, user_id: i64, song_id: i64) -> Result<bool> {
    let now = current_timestamp();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO user_likes (user_id, song_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(song_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a like. Returns false if there was none.
pub async fn unlike_song(pool: &Pool<Sqlite>, user_id: i64, song_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM user_likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The like row for a user and song, if any
pub async fn get_like(pool: &Pool<Sqlite>, user_id: i64, song_id: i64) -> Result<Option<Like>> {
    let like = sqlx::query_as::<_, Like>(
        "SELECT * FROM user_likes WHERE user_id = ? AND song_id = ?",
    )
    .bind(user_id)
    .bind(song_id)
    .fetch_optional(pool)
    .await?;
    Ok(like)
}

/// Check whether a user likes a song
pub async fn is_liked(pool: &Pool<Sqlite>, user_id: i64, song_id: i64) -> Result<bool> {
    Ok(get_like(pool, user_id, song_id).await?.is_some())
}

/// Flip the like state, returns the resulting state
pub async fn toggle_like(pool: &Pool<Sqlite>, user_id: i64, song_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM user_likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if !removed {
        sqlx::query("INSERT INTO user_likes (user_id, song_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(song_id)
            .bind(current_timestamp())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(!removed)
}

/// Ids of liked songs, most recently liked first
pub async fn get_liked_song_ids(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT song_id FROM user_likes WHERE user_id = ? ORDER BY id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Liked songs, most recently liked first
pub async fn get_liked_songs(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT s.* FROM songs s
        INNER JOIN user_likes ul ON s.id = ul.song_id
        WHERE ul.user_id = ?
        ORDER BY ul.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}
