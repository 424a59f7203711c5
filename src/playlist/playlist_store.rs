use super::playlist_models::Playlist;
use anyhow::Result;

pub trait PlaylistStore: Send + Sync {
    /// Returns all playlists of the user, in creation order.
    /// A user that never stored anything has no playlists.
    fn get_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>>;

    /// Replaces the whole playlist collection of the user.
    fn save_user_playlists(&self, user_id: &str, playlists: &Vec<Playlist>) -> Result<()>;

    /// Creates an empty collection for the user unless one exists already.
    fn init_user(&self, user_id: &str) -> Result<()>;
}
