//! Song catalog handlers

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::extract::ApiPath;
use crate::database::Song;

/// Query string for `GET /songs`
#[derive(Debug, Default, Deserialize)]
pub struct SongQuery {
    /// Only songs in this category
    pub category: Option<String>,
    /// Substring match on title, artist or category
    pub q: Option<String>,
}

/// `GET /songs`
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let songs = match (non_blank(query.category), non_blank(query.q)) {
        (Some(category), None) => state.db.get_songs_by_category(&category).await?,
        (None, Some(q)) => state.db.search_songs(&q).await?,
        (Some(category), Some(q)) => state
            .db
            .search_songs(&q)
            .await?
            .into_iter()
            .filter(|s| s.category.eq_ignore_ascii_case(category.trim()))
            .collect(),
        (None, None) => state.db.get_all_songs().await?,
    };

    Ok(Json(songs))
}

/// `GET /songs/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.get_categories().await?))
}

/// `GET /songs/{id}`
pub async fn get_song(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Song>> {
    state
        .db
        .get_song(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Song"))
}

/// `DELETE /songs/{id}`
///
/// Removes the row, its likes, and the stored audio and cover files.
pub async fn delete_song(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let song = state
        .db
        .delete_song(id)
        .await?
        .ok_or(ApiError::NotFound("Song"))?;

    state.media.remove(&song.filename).await;
    if let Some(image) = &song.image_filename {
        state.media.remove(image).await;
    }

    info!(song_id = id, title = %song.title, "Song deleted");
    Ok(Json(json!({ "message": "Song deleted successfully." })))
}
