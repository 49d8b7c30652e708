//! Database models for persistent storage
//! These models map directly to SQLite tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category assigned to songs uploaded without one
pub const DEFAULT_CATEGORY: &str = "New Release";

/// Registered listener
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique identifier (auto-increment)
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    pub email: String,
    /// Stored as entered. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Created timestamp
    pub created_at: i64,
}

/// Song metadata stored in database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    /// Unique identifier (auto-increment)
    pub id: i64,
    /// Song title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Catalog category (e.g. "Classical")
    pub category: String,
    /// Generated name of the audio file in the uploads directory
    pub filename: String,
    /// Generated name of the cover image, if one was uploaded
    pub image_filename: Option<String>,
    /// Created timestamp
    pub created_at: i64,
}

/// A user liking a song
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub song_id: i64,
    /// When the like was recorded
    pub created_at: i64,
}

// ============ Input structs for creating new records ============

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for creating a new song
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    /// Falls back to [`DEFAULT_CATEGORY`] when absent or blank
    pub category: Option<String>,
    pub filename: String,
    pub image_filename: Option<String>,
}

impl NewSong {
    /// Category that will actually be stored
    pub fn effective_category(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_not_serialized() {
        let user = User {
            id: 1,
            name: "Aarya".into(),
            email: "aarya@example.com".into(),
            password: "secret".into(),
            created_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "aarya@example.com");
    }

    #[test]
    fn blank_category_uses_default() {
        let mut song = NewSong {
            title: "Bhairav".into(),
            artist: "Dr. Prabha Atre".into(),
            category: Some("   ".into()),
            filename: "1.mp3".into(),
            image_filename: None,
        };
        assert_eq!(song.effective_category(), DEFAULT_CATEGORY);

        song.category = None;
        assert_eq!(song.effective_category(), DEFAULT_CATEGORY);

        song.category = Some(" Classical ".into());
        assert_eq!(song.effective_category(), "Classical");
    }
}
