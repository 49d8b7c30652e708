//! Typed client for the REST API
//!
//! Mirrors the fetches the browser client makes: catalog listing, uploads,
//! accounts and likes.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{ClientError, Result};
use crate::database::{Song, User};
use crate::server::{
    LikeState, LoginRequest, ProfileUpdate, SignupRequest, UploadResponse, UserResponse,
};

/// Placeholder stream for songs that have no uploaded file
pub const DEMO_AUDIO_URL: &str = "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3";

/// A file attached to an upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Name as picked by the user; only its extension is kept server-side
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Input for [`ApiClient::upload_song`]
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub artist: String,
    pub category: Option<String>,
    pub audio: UploadFile,
    pub image: Option<UploadFile>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// HTTP client bound to one API server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url`, e.g. `http://localhost:4000`
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Public URL of a stored upload
    pub fn upload_url(&self, filename: &str) -> Result<Url> {
        self.url(&format!("uploads/{filename}"))
    }

    /// Where the player should stream a song from
    pub fn audio_url(&self, song: &Song) -> Result<Url> {
        self.upload_url(&song.filename)
    }

    /// Cover art URL, if the song has one
    pub fn image_url(&self, song: &Song) -> Result<Option<Url>> {
        song.image_filename
            .as_deref()
            .map(|name| self.upload_url(name))
            .transpose()
    }

    // ============ Songs ============

    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        self.get_json("songs", &[]).await
    }

    pub async fn songs_in_category(&self, category: &str) -> Result<Vec<Song>> {
        self.get_json("songs", &[("category", category)]).await
    }

    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>> {
        self.get_json("songs", &[("q", query)]).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.get_json("songs/categories", &[]).await
    }

    pub async fn get_song(&self, id: i64) -> Result<Song> {
        self.get_json(&format!("songs/{id}"), &[]).await
    }

    /// Upload a song with its audio file and optional cover
    pub async fn upload_song(&self, req: UploadRequest) -> Result<Song> {
        let mut form = Form::new()
            .text("title", req.title)
            .text("artist", req.artist)
            .part(
                "audio",
                Part::bytes(req.audio.bytes).file_name(req.audio.file_name),
            );
        if let Some(category) = req.category {
            form = form.text("category", category);
        }
        if let Some(image) = req.image {
            form = form.part("image", Part::bytes(image.bytes).file_name(image.file_name));
        }

        let response = self
            .http
            .post(self.url("upload")?)
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = decode(response).await?;
        debug!("{}", body.message);
        Ok(body.song)
    }

    /// Delete a song, returns the server's confirmation message
    pub async fn delete_song(&self, id: i64) -> Result<String> {
        let response = self.http.delete(self.url(&format!("songs/{id}"))?).send().await?;
        let body: MessageBody = decode(response).await?;
        Ok(body.message)
    }

    // ============ Accounts ============

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let req = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("signup")?).json(&req).send().await?;
        Ok(decode::<UserResponse>(response).await?.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("login")?).json(&req).send().await?;
        Ok(decode::<UserResponse>(response).await?.user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        Ok(self
            .get_json::<UserResponse>(&format!("users/{id}"), &[])
            .await?
            .user)
    }

    pub async fn update_profile(&self, id: i64, name: &str) -> Result<User> {
        let req = ProfileUpdate {
            name: name.to_string(),
        };
        let response = self
            .http
            .put(self.url(&format!("users/{id}"))?)
            .json(&req)
            .send()
            .await?;
        Ok(decode::<UserResponse>(response).await?.user)
    }

    // ============ Likes ============

    pub async fn liked_songs(&self, user_id: i64) -> Result<Vec<Song>> {
        self.get_json(&format!("users/{user_id}/likes"), &[]).await
    }

    pub async fn liked_song_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.get_json(&format!("users/{user_id}/likes/ids"), &[])
            .await
    }

    /// Flip a like, returns whether the song is now liked
    pub async fn toggle_like(&self, user_id: i64, song_id: i64) -> Result<bool> {
        let response = self
            .http
            .post(self.url(&format!("users/{user_id}/likes/{song_id}/toggle"))?)
            .send()
            .await?;
        Ok(decode::<LikeState>(response).await?.liked)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.http.get(self.url(path)?).query(query).send().await?;
        decode(response).await
    }
}

/// Turn a response into `T`, or into [`ClientError::Api`] with the server's message
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
