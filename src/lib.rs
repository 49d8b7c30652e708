//! SwarSetu - a small music streaming service
//!
//! The server side stores songs, users and likes in SQLite and keeps uploaded
//! audio and cover art on disk. The client side is a typed HTTP client plus the
//! playback state a front end drives.

pub mod api;
pub mod database;
pub mod library;
pub mod media;
pub mod player;
pub mod server;
pub mod settings;
