//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all mixtape endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client. The API has no server side session, every call carries
/// the user id in its path.
#[derive(Clone)]
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client and registers the test user, returning the new user id
    ///
    /// # Panics
    ///
    /// Panics if registration fails (indicates test infrastructure problem).
    pub async fn registered(base_url: String) -> (Self, String) {
        let client = Self::new(base_url);

        let response = client.register(TEST_USER, TEST_PASS, TEST_FIRST_NAME).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user registration failed"
        );
        let body: Value = response.json().await.expect("Invalid register response");
        let user_id = body["user"]["id"]
            .as_str()
            .expect("Missing user id")
            .to_string();

        (client, user_id)
    }

    /// Creates a playlist and returns its id
    pub async fn create_playlist_id(&self, user_id: &str, name: &str) -> String {
        let response = self.create_playlist(user_id, name).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Invalid playlist response");
        body["playlist"]["id"]
            .as_str()
            .expect("Missing playlist id")
            .to_string()
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /api/auth/register
    pub async fn register(&self, username: &str, password: &str, first_name: &str) -> Response {
        self.register_raw(json!({
            "username": username,
            "password": password,
            "firstName": first_name,
        }))
        .await
    }

    /// POST /api/auth/register with an arbitrary body
    pub async fn register_raw(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /api/auth/login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /api/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .post(format!("{}/api/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /api/auth/check-username/{username}
    pub async fn check_username(&self, username: &str) -> Response {
        self.client
            .get(format!(
                "{}/api/auth/check-username/{}",
                self.base_url, username
            ))
            .send()
            .await
            .expect("Check username request failed")
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// GET /api/playlists/{user_id}
    pub async fn get_playlists(&self, user_id: &str) -> Response {
        self.client
            .get(format!("{}/api/playlists/{}", self.base_url, user_id))
            .send()
            .await
            .expect("Get playlists request failed")
    }

    /// POST /api/playlists/{user_id}
    pub async fn create_playlist(&self, user_id: &str, name: &str) -> Response {
        self.client
            .post(format!("{}/api/playlists/{}", self.base_url, user_id))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Create playlist request failed")
    }

    /// DELETE /api/playlists/{user_id}/{playlist_id}
    pub async fn delete_playlist(&self, user_id: &str, playlist_id: &str) -> Response {
        self.client
            .delete(format!(
                "{}/api/playlists/{}/{}",
                self.base_url, user_id, playlist_id
            ))
            .send()
            .await
            .expect("Delete playlist request failed")
    }

    /// POST /api/playlists/{user_id}/{playlist_id}/songs
    pub async fn add_song(&self, user_id: &str, playlist_id: &str, song: Value) -> Response {
        self.client
            .post(format!(
                "{}/api/playlists/{}/{}/songs",
                self.base_url, user_id, playlist_id
            ))
            .json(&song)
            .send()
            .await
            .expect("Add song request failed")
    }

    /// Adds a remote song with a generated title
    pub async fn add_video(&self, user_id: &str, playlist_id: &str, video_id: &str) -> Response {
        self.add_song(
            user_id,
            playlist_id,
            json!({
                "videoId": video_id,
                "title": format!("Video {}", video_id),
                "thumbnail": format!("https://img.example.com/{}.jpg", video_id),
                "duration": "3:45",
            }),
        )
        .await
    }

    /// DELETE /api/playlists/{user_id}/{playlist_id}/songs/{song_id}
    pub async fn remove_song(&self, user_id: &str, playlist_id: &str, song_id: &str) -> Response {
        self.client
            .delete(format!(
                "{}/api/playlists/{}/{}/songs/{}",
                self.base_url, user_id, playlist_id, song_id
            ))
            .send()
            .await
            .expect("Remove song request failed")
    }

    /// PATCH /api/playlists/{user_id}/{playlist_id}/songs/{song_id}/rating
    pub async fn update_rating(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
        rating: Value,
    ) -> Response {
        self.client
            .patch(format!(
                "{}/api/playlists/{}/{}/songs/{}/rating",
                self.base_url, user_id, playlist_id, song_id
            ))
            .json(&json!({ "rating": rating }))
            .send()
            .await
            .expect("Update rating request failed")
    }

    // ========================================================================
    // Upload Endpoints
    // ========================================================================

    /// POST /api/upload/{user_id}/{playlist_id}
    pub async fn upload(
        &self,
        user_id: &str,
        playlist_id: &str,
        field_name: &str,
        file_name: &str,
        mime: &str,
        contents: Vec<u8>,
    ) -> Response {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Invalid mime type");
        self.upload_form(user_id, playlist_id, Form::new().part(field_name.to_string(), part))
            .await
    }

    /// Uploads `contents` as an mp3 in the expected form field
    pub async fn upload_mp3(
        &self,
        user_id: &str,
        playlist_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Response {
        self.upload(
            user_id,
            playlist_id,
            "mp3file",
            file_name,
            "audio/mpeg",
            contents,
        )
        .await
    }

    /// POST /api/upload/{user_id}/{playlist_id} with a custom form
    pub async fn upload_form(&self, user_id: &str, playlist_id: &str, form: Form) -> Response {
        self.client
            .post(format!(
                "{}/api/upload/{}/{}",
                self.base_url, user_id, playlist_id
            ))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    // ========================================================================
    // Static files
    // ========================================================================

    /// GET an absolute path on the server, e.g. a song's `filePath`
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Get request failed")
    }
}
