//! User account operations
//!
//! Passwords are stored and compared as plain text.

use anyhow::Result;
use sqlx::{Pool, Sqlite};

use super::{current_timestamp, is_unique_violation};
use crate::database::{NewUser, User};

/// Create a user. Returns `None` when the email is already registered.
pub async fn create_user(pool: &Pool<Sqlite>, user: NewUser) -> Result<Option<i64>> {
    let now = current_timestamp();

    let result = sqlx::query(
        "INSERT INTO users (name, email, password, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user.name.trim())
    .bind(normalize_email(&user.email))
    .bind(&user.password)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(Some(done.last_insert_rowid())),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get user by id
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Get user by email (case-insensitive)
pub async fn get_user_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Look up a user by email and check the password
pub async fn verify_credentials(
    pool: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = get_user_by_email(pool, email).await?;
    Ok(user.filter(|u| u.password == password))
}

/// Rename a user. Returns false if the user does not exist.
pub async fn update_user_name(pool: &Pool<Sqlite>, id: i64, name: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
        .bind(name.trim())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete user by id; their likes go with them
pub async fn delete_user(pool: &Pool<Sqlite>, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
