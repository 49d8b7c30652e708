//! Liked-songs handlers

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::extract::ApiPath;
use crate::database::Song;

/// Like state of one song after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub song_id: i64,
    pub liked: bool,
    /// When the like was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_at: Option<i64>,
}

async fn like_state(state: &AppState, user_id: i64, song_id: i64) -> ApiResult<LikeState> {
    let like = state.db.get_like(user_id, song_id).await?;
    Ok(LikeState {
        song_id,
        liked: like.is_some(),
        liked_at: like.map(|l| l.created_at),
    })
}

async fn ensure_user(state: &AppState, user_id: i64) -> ApiResult<()> {
    match state.db.get_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("User")),
    }
}

async fn ensure_user_and_song(state: &AppState, user_id: i64, song_id: i64) -> ApiResult<()> {
    ensure_user(state, user_id).await?;
    match state.db.get_song(song_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Song")),
    }
}

/// `GET /users/{id}/likes`
pub async fn liked_songs(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Song>>> {
    ensure_user(&state, user_id).await?;
    Ok(Json(state.db.get_liked_songs(user_id).await?))
}

/// `GET /users/{id}/likes/ids`
pub async fn liked_song_ids(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<i64>>> {
    ensure_user(&state, user_id).await?;
    Ok(Json(state.db.get_liked_song_ids(user_id).await?))
}

/// `POST /users/{id}/likes/{song_id}/toggle`
pub async fn toggle_like(
    State(state): State<AppState>,
    ApiPath((user_id, song_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<LikeState>> {
    ensure_user_and_song(&state, user_id, song_id).await?;
    let liked = state.db.toggle_like(user_id, song_id).await?;
    tracing::debug!(user_id, song_id, liked, "Like toggled");
    Ok(Json(like_state(&state, user_id, song_id).await?))
}

/// `PUT /users/{id}/likes/{song_id}`
pub async fn like_song(
    State(state): State<AppState>,
    ApiPath((user_id, song_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<LikeState>> {
    ensure_user_and_song(&state, user_id, song_id).await?;
    state.db.like_song(user_id, song_id).await?;
    Ok(Json(like_state(&state, user_id, song_id).await?))
}

/// `DELETE /users/{id}/likes/{song_id}`
pub async fn unlike_song(
    State(state): State<AppState>,
    ApiPath((user_id, song_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<LikeState>> {
    ensure_user(&state, user_id).await?;
    state.db.unlike_song(user_id, song_id).await?;
    Ok(Json(like_state(&state, user_id, song_id).await?))
}
