//! Song CRUD operations

use anyhow::Result;
use sqlx::{Pool, Sqlite};

use super::current_timestamp;
use crate::database::{NewSong, Song};

/// Insert a new song, returns the new song id
pub async fn insert_song(pool: &Pool<Sqlite>, song: NewSong) -> Result<i64> {
    let now = current_timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO songs (title, artist, category, filename, image_filename, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song.title.trim())
    .bind(song.artist.trim())
    .bind(song.effective_category())
    .bind(&song.filename)
    .bind(&song.image_filename)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get song by id
pub async fn get_song(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(song)
}

/// Get all songs, newest first
pub async fn get_all_songs(pool: &Pool<Sqlite>) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>("SELECT * FROM songs ORDER BY id DESC")
        .fetch_all(pool)
        .await?;
    Ok(songs)
}

/// Get songs in one category, newest first
pub async fn get_songs_by_category(pool: &Pool<Sqlite>, category: &str) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        "SELECT * FROM songs WHERE category = ? COLLATE NOCASE ORDER BY id DESC",
    )
    .bind(category.trim())
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Search songs by title, artist, or category
pub async fn search_songs(pool: &Pool<Sqlite>, query: &str) -> Result<Vec<Song>> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT * FROM songs
        WHERE title LIKE ?1 ESCAPE '\' OR artist LIKE ?1 ESCAPE '\' OR category LIKE ?1 ESCAPE '\'
        ORDER BY id DESC
        "#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Distinct categories in alphabetical order
pub async fn get_categories(pool: &Pool<Sqlite>) -> Result<Vec<String>> {
    let categories =
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM songs ORDER BY category")
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

/// Delete song by id, returning the removed row
pub async fn delete_song(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>("DELETE FROM songs WHERE id = ? RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(song)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
