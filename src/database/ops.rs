//! Database operations organized by entity type

mod likes;
mod songs;
mod users;

pub use likes::*;
pub use songs::*;
pub use users::*;

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// True when the error is a UNIQUE constraint violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
