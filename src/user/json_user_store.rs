use super::{user_models::User, user_store::UserStore};
use crate::json_persistence::JsonFile;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub const USERS_FILE_NAME: &str = "users.json";

/// Keeps all users in a single JSON array.
pub struct JsonUserStore {
    file: JsonFile<Vec<User>>,
}

impl JsonUserStore {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let file = JsonFile::new(data_dir.as_ref().join(USERS_FILE_NAME));
        if !file.exists() {
            info!("Creating users file at {:?}", file.path());
        }
        file.create_if_missing(&vec![])?;
        Ok(JsonUserStore { file })
    }
}

impl UserStore for JsonUserStore {
    fn get_all_users(&self) -> Result<Vec<User>> {
        self.file.load()
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.file.load()?.into_iter().find(|u| u.id == user_id))
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .file
            .load()?
            .into_iter()
            .find(|u| u.has_username(username)))
    }

    fn insert_user(&self, user: User) -> Result<()> {
        let mut users = self.file.load()?;
        users.push(user);
        self.file.save(&users)
    }
}
