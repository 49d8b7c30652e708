//! Multipart song upload

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::database::{NewSong, Song};
use crate::media::MediaStore;

/// Body of a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub song: Song,
}

/// Fields collected from the multipart form
#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    artist: Option<String>,
    category: Option<String>,
    audio: Option<String>,
    image: Option<String>,
}

impl UploadForm {
    async fn read(&mut self, media: &MediaStore, multipart: &mut Multipart) -> ApiResult<()> {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => self.title = Some(field.text().await?),
                "artist" => self.artist = Some(field.text().await?),
                "category" => self.category = Some(field.text().await?),
                "audio" | "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked;
                    // an empty named file is treated the same way
                    if bytes.is_empty() {
                        continue;
                    }
                    let stored = media.save(&file_name, &bytes).await?;
                    let slot = if name == "audio" {
                        &mut self.audio
                    } else {
                        &mut self.image
                    };
                    if let Some(previous) = slot.replace(stored) {
                        media.remove(&previous).await;
                    }
                }
                other => warn!(field = %other, "Ignoring unknown upload field"),
            }
        }
        Ok(())
    }

    fn to_new_song(&self) -> ApiResult<NewSong> {
        let Some(filename) = self.audio.clone() else {
            return Err(ApiError::bad_request("No audio file was uploaded."));
        };

        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (Some(title), Some(artist)) = (non_blank(&self.title), non_blank(&self.artist)) else {
            return Err(ApiError::bad_request(
                "Title and Artist are required fields.",
            ));
        };

        Ok(NewSong {
            title,
            artist,
            category: self.category.clone(),
            filename,
            image_filename: self.image.clone(),
        })
    }

    /// Remove files already written for a rejected upload
    async fn discard(&self, media: &MediaStore) {
        for name in [&self.audio, &self.image].into_iter().flatten() {
            media.remove(name).await;
        }
    }
}

/// `POST /upload`
pub async fn upload_song(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut form = UploadForm::default();

    let outcome: ApiResult<Song> = async {
        form.read(&state.media, &mut multipart).await?;
        let new_song = form.to_new_song()?;
        let id = state.db.insert_song(new_song).await?;
        state
            .db
            .get_song(id)
            .await?
            .ok_or(ApiError::NotFound("Song"))
    }
    .await;

    match outcome {
        Ok(song) => {
            info!(song_id = song.id, title = %song.title, category = %song.category, "Song uploaded");
            Ok((
                StatusCode::CREATED,
                Json(UploadResponse {
                    message: format!("Song '{}' uploaded successfully!", song.title),
                    song,
                }),
            ))
        }
        Err(e) => {
            form.discard(&state.media).await;
            Err(e)
        }
    }
}
