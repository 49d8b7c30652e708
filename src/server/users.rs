//! Account handlers: sign-up, login and profile
//!
//! Credentials are plain text. There are no sessions; the client keeps the
//! returned user and passes its id in later requests.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath};
use crate::database::{NewUser, User};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: String,
}

/// Body returned by sign-up, login and profile routes
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if [&req.name, &req.email, &req.password]
        .iter()
        .any(|v| v.trim().is_empty())
    {
        return Err(ApiError::bad_request(
            "Name, email and password are required.",
        ));
    }

    let id = state
        .db
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?
        .ok_or_else(|| ApiError::Conflict("Email is already registered.".to_string()))?;

    let user = state
        .db
        .get_user(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required."));
    }

    let user = state
        .db
        .verify_credentials(&req.email, &req.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(UserResponse { user }))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .db
        .get_user(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse { user }))
}

/// `PUT /users/{id}`. Only the name is editable.
pub async fn update_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<UserResponse>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required."));
    }

    if !state.db.update_user_name(id, &req.name).await? {
        return Err(ApiError::NotFound("User"));
    }

    get_user(State(state), ApiPath(id)).await
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    if !state.db.delete_user(id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully." })))
}
