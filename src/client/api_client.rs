//! HTTP client for the mixtape API.

use crate::{
    api::{
        ApiEnvelope, CreatePlaylistBody, ExistsPayload, LoginBody, NoPayload, PlaylistPayload,
        PlaylistsPayload, SongPayload, UpdateRatingBody, UserPayload,
    },
    playlist::NewSong,
    server::UPLOAD_FIELD_NAME,
    user::NewUser,
};
use anyhow::{anyhow, Context, Result};
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Url,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// A decoded response. The payload is `None` when the server reported a
/// failure.
pub type ApiResponse<P> = ApiEnvelope<Option<P>>;

fn network_error<P>() -> ApiResponse<P> {
    ApiEnvelope {
        success: false,
        message: Some(NETWORK_ERROR_MESSAGE.to_string()),
        payload: None,
    }
}

/// One method per endpoint. Transport failures never surface as errors,
/// they come back as a failed envelope with [`NETWORK_ERROR_MESSAGE`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid server url {:?}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Server url {} cannot be a base", base_url));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("mixtape-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<P: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResponse<P> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Request failed: {}", err);
                return network_error();
            }
        };
        let status = response.status();
        match response.json::<ApiResponse<P>>().await {
            Ok(envelope) => {
                debug!("Response {} success={}", status, envelope.success);
                envelope
            }
            Err(err) => {
                warn!("Could not decode {} response: {}", status, err);
                network_error()
            }
        }
    }

    pub async fn register(&self, new_user: &NewUser) -> ApiResponse<UserPayload> {
        let url = self.url(&["api", "auth", "register"]);
        self.send(self.http.post(url).json(new_user)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResponse<UserPayload> {
        let body = LoginBody {
            username: username.to_string(),
            password: password.to_string(),
        };
        let url = self.url(&["api", "auth", "login"]);
        self.send(self.http.post(url).json(&body)).await
    }

    /// Always succeeds, the session lives on the client.
    pub async fn logout(&self) -> ApiResponse<NoPayload> {
        let url = self.url(&["api", "auth", "logout"]);
        let response: ApiResponse<NoPayload> = self.send(self.http.post(url)).await;
        if !response.success {
            debug!("Ignoring logout failure: {:?}", response.message);
        }
        ApiEnvelope::ok(Some(NoPayload {}))
    }

    /// Unknown on failure, reported as not existing.
    pub async fn check_username(&self, username: &str) -> bool {
        let url = self.url(&["api", "auth", "check-username", username]);
        let response: ApiResponse<ExistsPayload> = self.send(self.http.get(url)).await;
        response.payload.map(|p| p.exists).unwrap_or(false)
    }

    pub async fn get_playlists(&self, user_id: &str) -> ApiResponse<PlaylistsPayload> {
        let url = self.url(&["api", "playlists", user_id]);
        self.send(self.http.get(url)).await
    }

    pub async fn create_playlist(&self, user_id: &str, name: &str) -> ApiResponse<PlaylistPayload> {
        let body = CreatePlaylistBody {
            name: name.to_string(),
        };
        let url = self.url(&["api", "playlists", user_id]);
        self.send(self.http.post(url).json(&body)).await
    }

    pub async fn delete_playlist(&self, user_id: &str, playlist_id: &str) -> ApiResponse<NoPayload> {
        let url = self.url(&["api", "playlists", user_id, playlist_id]);
        self.send(self.http.delete(url)).await
    }

    pub async fn add_song(
        &self,
        user_id: &str,
        playlist_id: &str,
        song: &NewSong,
    ) -> ApiResponse<SongPayload> {
        let url = self.url(&["api", "playlists", user_id, playlist_id, "songs"]);
        self.send(self.http.post(url).json(song)).await
    }

    pub async fn remove_song(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> ApiResponse<NoPayload> {
        let url = self.url(&["api", "playlists", user_id, playlist_id, "songs", song_id]);
        self.send(self.http.delete(url)).await
    }

    pub async fn update_rating(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
        rating: i64,
    ) -> ApiResponse<NoPayload> {
        let url = self.url(&[
            "api",
            "playlists",
            user_id,
            playlist_id,
            "songs",
            song_id,
            "rating",
        ]);
        self.send(self.http.patch(url).json(&UpdateRatingBody { rating }))
            .await
    }

    pub async fn upload_mp3(
        &self,
        user_id: &str,
        playlist_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ApiResponse<SongPayload> {
        let mime = if file_name.to_lowercase().ends_with(".mp3") {
            "audio/mpeg"
        } else {
            "application/octet-stream"
        };
        let part = match Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(mime)
        {
            Ok(part) => part,
            Err(err) => {
                warn!("Could not build upload form: {}", err);
                return network_error();
            }
        };
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);
        let url = self.url(&["api", "upload", user_id, playlist_id]);
        self.send(self.http.post(url).multipart(form)).await
    }
}
