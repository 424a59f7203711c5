mod json_playlist_store;
mod playlist_manager;
pub mod playlist_models;
mod playlist_store;

pub use json_playlist_store::{JsonPlaylistStore, PLAYLISTS_DIR_NAME};
pub use playlist_manager::{PlaylistError, PlaylistManager};
pub use playlist_models::{
    NewSong, Playlist, Song, SongOrder, SongSource, LOCAL_SONG_DURATION, LOCAL_SONG_THUMBNAIL,
};
pub use playlist_store::PlaylistStore;
