use super::api_client::{ApiClient, ApiResponse};
use crate::{
    playlist::{NewSong, Playlist, Song, SongOrder},
    user::{NewUser, UserView},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum RepositoryError {
    /// The server refused the request, or could not be reached.
    #[error("{0}")]
    Rejected(String),
}

fn into_result<P>(response: ApiResponse<P>) -> Result<P, RepositoryError> {
    match (response.success, response.payload) {
        (true, Some(payload)) => Ok(payload),
        (_, _) => Err(RepositoryError::Rejected(
            response
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        )),
    }
}

/// The logged-in user's playlists, mirrored from the server.
///
/// Mutations go to the server first and touch the local copy only once the
/// server confirmed them. Nothing is refreshed in the background; call
/// [`PlaylistRepository::fetch`] to resync.
pub struct PlaylistRepository {
    client: ApiClient,
    user: UserView,
    cache: Option<Vec<Playlist>>,
}

impl PlaylistRepository {
    pub fn new(client: ApiClient, user: UserView) -> Self {
        Self {
            client,
            user,
            cache: None,
        }
    }

    pub async fn login(
        client: ApiClient,
        username: &str,
        password: &str,
    ) -> Result<Self, RepositoryError> {
        let payload = into_result(client.login(username, password).await)?;
        Ok(Self::new(client, payload.user))
    }

    /// Registers and starts a session for the new user.
    pub async fn register(client: ApiClient, new_user: &NewUser) -> Result<Self, RepositoryError> {
        let payload = into_result(client.register(new_user).await)?;
        Ok(Self::new(client, payload.user))
    }

    pub fn user(&self) -> &UserView {
        &self.user
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Replaces the local copy with the server's.
    pub async fn fetch(&mut self) -> Result<&[Playlist], RepositoryError> {
        let payload = into_result(self.client.get_playlists(&self.user.id).await)?;
        debug!(
            "Fetched {} playlists of {}",
            payload.playlists.len(),
            self.user.id
        );
        Ok(self.cache.insert(payload.playlists))
    }

    /// The local copy, fetched on first access.
    pub async fn playlists(&mut self) -> Result<&[Playlist], RepositoryError> {
        if self.cache.is_none() {
            return self.fetch().await;
        }
        Ok(self.cached_playlists())
    }

    /// The local copy as it is, empty before the first fetch.
    pub fn cached_playlists(&self) -> &[Playlist] {
        self.cache.as_deref().unwrap_or(&[])
    }

    fn cached_playlist_mut(&mut self, playlist_id: &str) -> Option<&mut Playlist> {
        self.cache
            .as_mut()?
            .iter_mut()
            .find(|p| p.id == playlist_id)
    }

    pub async fn create_playlist(&mut self, name: &str) -> Result<Playlist, RepositoryError> {
        let payload = into_result(self.client.create_playlist(&self.user.id, name).await)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.push(payload.playlist.clone());
        }
        Ok(payload.playlist)
    }

    pub async fn delete_playlist(&mut self, playlist_id: &str) -> Result<(), RepositoryError> {
        into_result(
            self.client
                .delete_playlist(&self.user.id, playlist_id)
                .await,
        )?;
        if let Some(cache) = self.cache.as_mut() {
            cache.retain(|p| p.id != playlist_id);
        }
        Ok(())
    }

    pub async fn add_song(
        &mut self,
        playlist_id: &str,
        song: &NewSong,
    ) -> Result<Song, RepositoryError> {
        let payload = into_result(
            self.client
                .add_song(&self.user.id, playlist_id, song)
                .await,
        )?;
        if let Some(playlist) = self.cached_playlist_mut(playlist_id) {
            playlist.songs.push(payload.song.clone());
        }
        Ok(payload.song)
    }

    pub async fn remove_song(
        &mut self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), RepositoryError> {
        into_result(
            self.client
                .remove_song(&self.user.id, playlist_id, song_id)
                .await,
        )?;
        if let Some(playlist) = self.cached_playlist_mut(playlist_id) {
            playlist.songs.retain(|s| !s.matches_id(song_id));
        }
        Ok(())
    }

    pub async fn update_rating(
        &mut self,
        playlist_id: &str,
        song_id: &str,
        rating: i64,
    ) -> Result<(), RepositoryError> {
        into_result(
            self.client
                .update_rating(&self.user.id, playlist_id, song_id, rating)
                .await,
        )?;
        if let Some(song) = self
            .cached_playlist_mut(playlist_id)
            .and_then(|p| p.songs.iter_mut().find(|s| s.matches_id(song_id)))
        {
            song.rating = rating;
        }
        Ok(())
    }

    pub async fn upload_mp3(
        &mut self,
        playlist_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Song, RepositoryError> {
        let payload = into_result(
            self.client
                .upload_mp3(&self.user.id, playlist_id, file_name, contents)
                .await,
        )?;
        if let Some(playlist) = self.cached_playlist_mut(playlist_id) {
            playlist.songs.push(payload.song.clone());
        }
        Ok(payload.song)
    }

    pub fn find_playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        self.cached_playlists().iter().find(|p| p.id == playlist_id)
    }

    /// Cached songs of a playlist matching `filter`, in `order`. Empty when
    /// the playlist is not cached.
    pub fn songs_view(&self, playlist_id: &str, filter: &str, order: SongOrder) -> Vec<&Song> {
        self.find_playlist(playlist_id)
            .map(|p| p.songs_view(filter, order))
            .unwrap_or_default()
    }

    /// Whether any cached playlist holds the remote video.
    pub fn contains_video(&self, video_id: &str) -> bool {
        self.cached_playlists()
            .iter()
            .any(|p| p.contains_video(video_id))
    }

    pub fn playlists_containing_video(&self, video_id: &str) -> Vec<&Playlist> {
        self.cached_playlists()
            .iter()
            .filter(|p| p.contains_video(video_id))
            .collect()
    }

    /// Ends the session. Server errors are ignored and the cache is dropped,
    /// the client is handed back for a new login.
    pub async fn logout(mut self) -> ApiClient {
        self.client.logout().await;
        self.cache = None;
        debug!("User {} logged out", self.user.id);
        self.client
    }
}
