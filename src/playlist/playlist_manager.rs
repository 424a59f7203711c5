use super::{
    playlist_models::{NewSong, Playlist, Song},
    playlist_store::PlaylistStore,
};
use crate::{ids::generate_playlist_id, upload::UploadStore};
use anyhow::anyhow;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("{0}")]
    Validation(String),

    #[error("Playlist not found")]
    PlaylistNotFound,

    #[error("Song not found in playlist")]
    SongNotFound,

    #[error("Song already exists in playlist")]
    DuplicateSong,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

type UserLock = Arc<Mutex<()>>;

/// Playlist operations scoped to a user.
///
/// Every mutation loads the user's whole collection, changes it in memory and
/// writes it back. Mutations of the same user run one at a time.
pub struct PlaylistManager {
    store: Box<dyn PlaylistStore>,
    uploads: Arc<UploadStore>,
    /// Entries exist only while a mutation of that user is running.
    user_locks: Mutex<HashMap<String, UserLock>>,
}

impl PlaylistManager {
    pub fn new(store: Box<dyn PlaylistStore>, uploads: Arc<UploadStore>) -> Self {
        Self {
            store,
            uploads,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    fn user_lock(&self, user_id: &str) -> Result<UserLock, PlaylistError> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|_| anyhow!("Playlist locks poisoned"))?;
        Ok(locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Drops the user's lock entry once no mutation holds it.
    fn release_user_lock(&self, user_id: &str) {
        let Ok(mut locks) = self.user_locks.lock() else {
            return;
        };
        if locks
            .get(user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(user_id);
        }
    }

    /// Runs `f` on the user's playlists under the user lock, and saves the
    /// collection if `f` succeeds.
    fn mutate<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Vec<Playlist>) -> Result<R, PlaylistError>,
    ) -> Result<R, PlaylistError> {
        let lock = self.user_lock(user_id)?;
        let result = self.mutate_locked(&lock, user_id, f);
        drop(lock);
        self.release_user_lock(user_id);
        result
    }

    fn mutate_locked<R>(
        &self,
        lock: &Mutex<()>,
        user_id: &str,
        f: impl FnOnce(&mut Vec<Playlist>) -> Result<R, PlaylistError>,
    ) -> Result<R, PlaylistError> {
        let _guard = lock
            .lock()
            .map_err(|_| anyhow!("Playlist lock of {} poisoned", user_id))?;
        let mut playlists = self.store.get_user_playlists(user_id)?;
        let result = f(&mut playlists)?;
        self.store.save_user_playlists(user_id, &playlists)?;
        Ok(result)
    }

    fn find_playlist<'a>(
        playlists: &'a mut [Playlist],
        playlist_id: &str,
    ) -> Result<&'a mut Playlist, PlaylistError> {
        playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or(PlaylistError::PlaylistNotFound)
    }

    fn remove_local_files<'a>(&self, songs: impl IntoIterator<Item = &'a Song>) {
        for path in songs.into_iter().filter_map(|s| s.local_file_path()) {
            self.uploads.remove(path);
        }
    }

    /// Creates the empty collection of a newly registered user.
    pub fn init_user(&self, user_id: &str) -> Result<(), PlaylistError> {
        self.store.init_user(user_id)?;
        Ok(())
    }

    pub fn get_playlists(&self, user_id: &str) -> Result<Vec<Playlist>, PlaylistError> {
        Ok(self.store.get_user_playlists(user_id)?)
    }

    pub fn create_playlist(&self, user_id: &str, name: &str) -> Result<Playlist, PlaylistError> {
        if name.trim().is_empty() {
            return Err(PlaylistError::Validation(
                "Playlist name is required".to_string(),
            ));
        }
        let playlist = Playlist {
            id: generate_playlist_id(),
            name: name.to_string(),
            songs: vec![],
            created_at: Utc::now(),
        };
        self.mutate(user_id, |playlists| {
            playlists.push(playlist.clone());
            Ok(())
        })?;
        info!("User {} created playlist {}", user_id, playlist.id);
        Ok(playlist)
    }

    /// Deletes the playlist together with the uploaded files of its local songs.
    /// Files go first, removal is best effort.
    pub fn delete_playlist(&self, user_id: &str, playlist_id: &str) -> Result<(), PlaylistError> {
        let removed = self.mutate(user_id, |playlists| {
            let index = playlists
                .iter()
                .position(|p| p.id == playlist_id)
                .ok_or(PlaylistError::PlaylistNotFound)?;
            self.remove_local_files(&playlists[index].songs);
            Ok(playlists.remove(index))
        })?;
        info!(
            "User {} deleted playlist {} ({} songs)",
            user_id,
            playlist_id,
            removed.songs.len()
        );
        Ok(())
    }

    /// Appends a song. Rating starts at 0 and `addedAt` is set here.
    pub fn add_song(
        &self,
        user_id: &str,
        playlist_id: &str,
        new_song: NewSong,
    ) -> Result<Song, PlaylistError> {
        let source = new_song.source().ok_or_else(|| {
            PlaylistError::Validation("Song must have a videoId or localId".to_string())
        })?;
        let song = Song {
            source,
            title: new_song.title,
            thumbnail: new_song.thumbnail,
            duration: new_song.duration,
            rating: 0,
            added_at: Utc::now(),
        };
        self.mutate(user_id, |playlists| {
            let playlist = Self::find_playlist(playlists, playlist_id)?;
            if playlist.songs.iter().any(|s| s.source.same_as(&song.source)) {
                return Err(PlaylistError::DuplicateSong);
            }
            playlist.songs.push(song.clone());
            Ok(())
        })?;
        debug!(
            "Added song {} to playlist {} of {}",
            song.id(),
            playlist_id,
            user_id
        );
        Ok(song)
    }

    /// Removes the song matching `song_id` as either a video or a local id.
    pub fn remove_song(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), PlaylistError> {
        self.mutate(user_id, |playlists| {
            let playlist = Self::find_playlist(playlists, playlist_id)?;
            let index = playlist
                .songs
                .iter()
                .position(|s| s.matches_id(song_id))
                .ok_or(PlaylistError::SongNotFound)?;
            self.remove_local_files([&playlist.songs[index]]);
            playlist.songs.remove(index);
            Ok(())
        })?;
        debug!(
            "Removed song {} from playlist {} of {}",
            song_id, playlist_id, user_id
        );
        Ok(())
    }

    pub fn update_rating(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
        rating: i64,
    ) -> Result<(), PlaylistError> {
        self.mutate(user_id, |playlists| {
            let playlist = Self::find_playlist(playlists, playlist_id)?;
            let song = playlist
                .songs
                .iter_mut()
                .find(|s| s.matches_id(song_id))
                .ok_or(PlaylistError::SongNotFound)?;
            song.rating = rating;
            Ok(())
        })
    }
}
