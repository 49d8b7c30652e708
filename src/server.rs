//! # REST API server
//!
//! Axum router translating REST verbs into database calls, plus static
//! serving of the uploads directory.
//!
//! ## Endpoints
//!
//! | Path | Description |
//! |------|-------------|
//! | `POST /upload` | Multipart song upload (`title`, `artist`, `category`, `audio`, `image`) |
//! | `GET /songs` | Catalog, newest first (`?category=`, `?q=`) |
//! | `GET /songs/categories` | Distinct categories |
//! | `GET, DELETE /songs/{id}` | Single song |
//! | `POST /signup`, `POST /login` | Accounts |
//! | `GET, PUT, DELETE /users/{id}` | Profile |
//! | `GET /users/{id}/likes[/ids]` | Liked songs |
//! | `POST /users/{id}/likes/{song_id}/toggle` | Flip a like |
//! | `PUT, DELETE /users/{id}/likes/{song_id}` | Set or clear a like |
//! | `GET /uploads/{file}` | Stored audio and cover files, range requests included |

mod error;
mod extract;
mod likes;
mod songs;
mod upload;
mod users;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::database::Database;
use crate::media::MediaStore;
use crate::settings::ServerSettings;

pub use error::{ApiError, ApiResult};
pub use likes::LikeState;
pub use upload::UploadResponse;
pub use users::{LoginRequest, ProfileUpdate, SignupRequest, UserResponse};

/// Shared state passed to all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub media: MediaStore,
}

/// Build the router with every endpoint.
pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    let uploads = ServeDir::new(state.media.root());

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload::upload_song))
        .route("/songs", get(songs::list_songs))
        .route("/songs/categories", get(songs::list_categories))
        .route("/songs/{id}", get(songs::get_song).delete(songs::delete_song))
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_profile)
                .delete(users::delete_user),
        )
        .route("/users/{id}/likes", get(likes::liked_songs))
        .route("/users/{id}/likes/ids", get(likes::liked_song_ids))
        .route(
            "/users/{id}/likes/{song_id}",
            delete(likes::unlike_song).put(likes::like_song),
        )
        .route("/users/{id}/likes/{song_id}/toggle", post(likes::toggle_like))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if settings.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Bind the listener and serve until Ctrl-C.
pub async fn serve(state: AppState, settings: &ServerSettings) -> Result<()> {
    let addr = settings.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let local_addr = listener.local_addr()?;

    info!(
        uploads = %state.media.root().display(),
        "Server is running on http://{}",
        local_addr
    );

    axum::serve(listener, router(state, settings))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    info!("Server stopped");
    Ok(())
}

/// Spawn the server on an already bound listener and return its address.
///
/// Used by tests and embedders that pick port 0.
pub async fn spawn(state: AppState, settings: &ServerSettings) -> Result<SocketAddr> {
    let listener = TcpListener::bind(settings.socket_addr()).await?;
    let local_addr = listener.local_addr()?;
    let app = router(state, settings);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "swarsetu-test-boundary";

    struct Harness {
        _dir: TempDir,
        state: AppState,
        app: Router,
    }

    async fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        let media = MediaStore::open(dir.path().join("uploads")).await.unwrap();
        let state = AppState { db, media };
        let app = router(state.clone(), &ServerSettings::default());
        Harness {
            _dir: dir,
            state,
            app,
        }
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn upload_count(h: &Harness) -> usize {
        std::fs::read_dir(h.state.media.root()).unwrap().count()
    }

    async fn upload(h: &Harness, title: &str, category: &str) -> Value {
        let (status, body) = send(
            &h.app,
            multipart(&[
                Part::Text("title", title),
                Part::Text("artist", "Jagjit Singh"),
                Part::Text("category", category),
                Part::File("audio", "ghazal.mp3", b"ID3-audio"),
                Part::File("image", "cover.jpg", b"jpeg-bytes"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn signup(h: &Harness, email: &str) -> i64 {
        let (status, body) = send(
            &h.app,
            json_request(
                "POST",
                "/signup",
                json!({ "name": "Aarya", "email": email, "password": "pw" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["user"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let h = harness().await;
        let (status, body) = send(&h.app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn upload_list_and_serve() {
        let h = harness().await;
        let body = upload(&h, "Jhuki Jhuki si nazar", "Ghazal").await;
        assert_eq!(
            body["message"],
            "Song 'Jhuki Jhuki si nazar' uploaded successfully!"
        );
        let filename = body["song"]["filename"].as_str().unwrap().to_string();
        assert!(filename.ends_with(".mp3"));
        assert!(body["song"]["image_filename"].as_str().unwrap().ends_with(".jpg"));

        upload(&h, "Wo kagaz ki kashti", "Ghazal").await;

        let (status, songs) = send(&h.app, empty_request("GET", "/songs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(songs[0]["title"], "Wo kagaz ki kashti");
        assert_eq!(songs[1]["title"], "Jhuki Jhuki si nazar");

        let response = h
            .app
            .clone()
            .oneshot(empty_request("GET", &format!("/uploads/{filename}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ID3-audio");
    }

    #[tokio::test]
    async fn uploads_support_range_requests() {
        let h = harness().await;
        let body = upload(&h, "Bhairav", "Classical").await;
        let filename = body["song"]["filename"].as_str().unwrap();

        let request = Request::get(format!("/uploads/{filename}"))
            .header(header::RANGE, "bytes=0-2")
            .body(Body::empty())
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ID3");
    }

    #[tokio::test]
    async fn upload_without_audio_is_rejected() {
        let h = harness().await;
        let (status, body) = send(
            &h.app,
            multipart(&[
                Part::Text("title", "Todi"),
                Part::Text("artist", "Dr. Prabha Atre"),
                Part::File("image", "cover.png", b"png"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No audio file was uploaded.");
        assert_eq!(upload_count(&h), 0, "orphaned cover must be removed");
    }

    #[tokio::test]
    async fn empty_audio_file_is_rejected() {
        let h = harness().await;
        let (status, body) = send(
            &h.app,
            multipart(&[
                Part::Text("title", "Bhairav"),
                Part::Text("artist", "Dr. Prabha Atre"),
                Part::File("audio", "bhairav.mp3", b""),
                Part::File("image", "cover.png", b"png"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No audio file was uploaded.");
        assert_eq!(upload_count(&h), 0);
    }

    #[tokio::test]
    async fn upload_without_title_removes_files() {
        let h = harness().await;
        let (status, body) = send(
            &h.app,
            multipart(&[
                Part::Text("title", "  "),
                Part::Text("artist", "Dr. Prabha Atre"),
                Part::File("audio", "todi.mp3", b"audio"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title and Artist are required fields.");
        assert_eq!(upload_count(&h), 0);
    }

    #[tokio::test]
    async fn empty_image_part_is_ignored() {
        let h = harness().await;
        let (status, body) = send(
            &h.app,
            multipart(&[
                Part::Text("title", "Lalit"),
                Part::Text("artist", "Dr. Prabha Atre"),
                Part::File("audio", "lalit.ogg", b"audio"),
                Part::File("image", "", b""),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["song"]["image_filename"].is_null());
        assert_eq!(body["song"]["category"], "New Release");
        assert_eq!(upload_count(&h), 1);
    }

    #[tokio::test]
    async fn filter_search_and_categories() {
        let h = harness().await;
        upload(&h, "Raag Yaman", "Classical").await;
        upload(&h, "Bairi Piya", "Semi-Classical").await;
        upload(&h, "Raag Sarang", "Classical").await;

        let (_, songs) = send(&h.app, empty_request("GET", "/songs?category=Classical")).await;
        assert_eq!(songs.as_array().unwrap().len(), 2);

        let (_, songs) = send(&h.app, empty_request("GET", "/songs?q=piya")).await;
        assert_eq!(songs.as_array().unwrap().len(), 1);

        let (_, songs) = send(
            &h.app,
            empty_request("GET", "/songs?q=raag&category=Semi-Classical"),
        )
        .await;
        assert!(songs.as_array().unwrap().is_empty());

        let (_, categories) = send(&h.app, empty_request("GET", "/songs/categories")).await;
        assert_eq!(categories, json!(["Classical", "Semi-Classical"]));
    }

    #[tokio::test]
    async fn delete_song_removes_row_and_files() {
        let h = harness().await;
        let body = upload(&h, "Tere bin", "Semi-Classical").await;
        let id = body["song"]["id"].as_i64().unwrap();
        assert_eq!(upload_count(&h), 2);

        let (status, body) = send(&h.app, empty_request("DELETE", &format!("/songs/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Song deleted successfully.");
        assert_eq!(upload_count(&h), 0);

        let (status, body) = send(&h.app, empty_request("DELETE", &format!("/songs/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Song not found.");

        let (status, _) = send(&h.app, empty_request("GET", &format!("/songs/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let h = harness().await;
        let (status, body) = send(&h.app, empty_request("GET", "/songs/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&h.app, empty_request("POST", "/users/1/likes/x/toggle")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bad_json_bodies_get_json_errors() {
        let h = harness().await;

        let (status, body) = send(
            &h.app,
            json_request("POST", "/signup", json!({ "name": "Aarya", "email": "a@b.c" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name, email and password are required.");

        let (status, body) = send(&h.app, json_request("POST", "/login", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required.");

        let garbled = Request::builder()
            .method("POST")
            .uri("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\":"))
            .unwrap();
        let (status, body) = send(&h.app, garbled).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &h.app,
            json_request("PUT", "/users/1", json!({ "name": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn signup_and_login() {
        let h = harness().await;
        let id = signup(&h, "aarya@example.com").await;

        let (status, body) = send(
            &h.app,
            json_request(
                "POST",
                "/signup",
                json!({ "name": "Other", "email": "AARYA@example.com", "password": "x" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email is already registered.");

        let (status, body) = send(
            &h.app,
            json_request(
                "POST",
                "/login",
                json!({ "email": "aarya@example.com", "password": "pw" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], id);
        assert!(body["user"].get("password").is_none());

        let (status, body) = send(
            &h.app,
            json_request(
                "POST",
                "/login",
                json!({ "email": "aarya@example.com", "password": "nope" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password.");

        let (status, _) = send(
            &h.app,
            json_request("POST", "/signup", json!({ "name": "", "email": "x@y", "password": "p" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn profile_update_and_delete() {
        let h = harness().await;
        let id = signup(&h, "aarya@example.com").await;

        let (status, body) = send(
            &h.app,
            json_request("PUT", &format!("/users/{id}"), json!({ "name": "Aarya Tilak" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Aarya Tilak");
        assert_eq!(body["user"]["email"], "aarya@example.com");

        let (status, _) = send(
            &h.app,
            json_request("PUT", "/users/999", json!({ "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&h.app, empty_request("DELETE", &format!("/users/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&h.app, empty_request("GET", &format!("/users/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found.");
    }

    #[tokio::test]
    async fn likes_toggle_and_list() {
        let h = harness().await;
        let user = signup(&h, "aarya@example.com").await;
        let a = upload(&h, "A", "Ghazal").await["song"]["id"].as_i64().unwrap();
        let b = upload(&h, "B", "Ghazal").await["song"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &h.app,
            empty_request("POST", &format!("/users/{user}/likes/{a}/toggle")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["song_id"], a);
        assert_eq!(body["liked"], true);
        assert!(body["liked_at"].as_i64().unwrap() > 0);

        let (_, body) = send(&h.app, empty_request("PUT", &format!("/users/{user}/likes/{b}"))).await;
        assert_eq!(body["liked"], true);
        // Idempotent
        let (status, _) =
            send(&h.app, empty_request("PUT", &format!("/users/{user}/likes/{b}"))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, ids) = send(&h.app, empty_request("GET", &format!("/users/{user}/likes/ids"))).await;
        assert_eq!(ids, json!([b, a]));

        let (_, songs) = send(&h.app, empty_request("GET", &format!("/users/{user}/likes"))).await;
        assert_eq!(songs[0]["title"], "B");

        let (_, body) = send(
            &h.app,
            empty_request("POST", &format!("/users/{user}/likes/{a}/toggle")),
        )
        .await;
        assert_eq!(body, json!({ "song_id": a, "liked": false }));

        let (_, body) =
            send(&h.app, empty_request("DELETE", &format!("/users/{user}/likes/{b}"))).await;
        assert_eq!(body["liked"], false);

        let (_, ids) = send(&h.app, empty_request("GET", &format!("/users/{user}/likes/ids"))).await;
        assert_eq!(ids, json!([]));
    }

    #[tokio::test]
    async fn likes_require_existing_rows() {
        let h = harness().await;
        let user = signup(&h, "aarya@example.com").await;

        let (status, body) = send(
            &h.app,
            empty_request("POST", &format!("/users/{user}/likes/42/toggle")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Song not found.");

        let (status, body) = send(&h.app, empty_request("GET", "/users/77/likes")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found.");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        let media = MediaStore::open(dir.path().join("uploads")).await.unwrap();
        let settings = ServerSettings {
            max_upload_mb: 1,
            ..ServerSettings::default()
        };
        let app = router(AppState { db, media: media.clone() }, &settings);

        let big = vec![0u8; 2 * 1024 * 1024];
        let (status, body) = send(
            &app,
            multipart(&[
                Part::Text("title", "Huge"),
                Part::Text("artist", "Someone"),
                Part::File("audio", "huge.wav", &big),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Upload exceeds the size limit.");
        assert_eq!(std::fs::read_dir(media.root()).unwrap().count(), 0);
    }
}
