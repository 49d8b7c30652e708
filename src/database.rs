//! Database module for persistent storage
//! Uses SQLite via sqlx for storing users, songs, and likes

mod models;
mod ops;
mod repository;
mod schema;

pub use models::*;
pub use ops::current_timestamp;
pub use repository::Database;
pub use schema::TABLES;
