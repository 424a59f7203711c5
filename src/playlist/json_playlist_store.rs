use super::{playlist_models::Playlist, playlist_store::PlaylistStore};
use crate::{ids::is_safe_id, json_persistence::JsonFile};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub const PLAYLISTS_DIR_NAME: &str = "playlists";

/// One `<userId>.json` file per user under the playlists directory.
pub struct JsonPlaylistStore {
    dir: PathBuf,
}

impl JsonPlaylistStore {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref().join(PLAYLISTS_DIR_NAME);
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
        Ok(JsonPlaylistStore { dir })
    }

    fn user_file(&self, user_id: &str) -> Result<JsonFile<Vec<Playlist>>> {
        if !is_safe_id(user_id) {
            bail!("Invalid user id {:?}", user_id);
        }
        Ok(JsonFile::new(self.dir.join(format!("{}.json", user_id))))
    }
}

impl PlaylistStore for JsonPlaylistStore {
    fn get_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
        self.user_file(user_id)?.load()
    }

    fn save_user_playlists(&self, user_id: &str, playlists: &Vec<Playlist>) -> Result<()> {
        self.user_file(user_id)?.save(playlists)
    }

    fn init_user(&self, user_id: &str) -> Result<()> {
        self.user_file(user_id)?.create_if_missing(&vec![])
    }
}
