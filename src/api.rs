//! REST API client module
//!
//! Provides a typed client for the catalog, account and like endpoints.

mod client;
mod error;

pub use client::{ApiClient, DEMO_AUDIO_URL, UploadFile, UploadRequest};
pub use error::{ClientError, Result};
