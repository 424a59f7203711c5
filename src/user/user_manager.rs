use super::{
    auth::{check_password_policy, PasswordCredentials},
    user_models::{NewUser, User},
    user_store::UserStore,
};
use crate::{ids::generate_user_id, playlist::PlaylistManager};
use anyhow::{anyhow, Context};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct UserManager {
    user_store: Arc<Mutex<Box<dyn UserStore>>>,
    playlists: Arc<PlaylistManager>,
}

impl UserManager {
    pub fn new(user_store: Box<dyn UserStore>, playlists: Arc<PlaylistManager>) -> Self {
        Self {
            user_store: Arc::new(Mutex::new(user_store)),
            playlists,
        }
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, Box<dyn UserStore>>, UserError> {
        self.user_store
            .lock()
            .map_err(|_| UserError::Internal(anyhow!("User store lock poisoned")))
    }

    /// Validates the form, stores the user and sets up their empty playlist
    /// collection. Usernames are unique ignoring case.
    pub fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        if new_user.username.trim().is_empty()
            || new_user.password.is_empty()
            || new_user.first_name.trim().is_empty()
        {
            return Err(UserError::Validation(
                "Username, password, and first name are required".to_string(),
            ));
        }
        check_password_policy(&new_user.password)
            .map_err(|violation| UserError::Validation(violation.to_string()))?;

        let store = self.lock_store()?;
        if store.find_user_by_username(&new_user.username)?.is_some() {
            return Err(UserError::UsernameTaken);
        }

        let user = User {
            id: generate_user_id(),
            username: new_user.username,
            password_hash: PasswordCredentials::create(&new_user.password)?,
            first_name: new_user.first_name,
            image_url: new_user.image_url.filter(|url| !url.trim().is_empty()),
            created_at: Utc::now(),
        };
        store
            .insert_user(user.clone())
            .with_context(|| format!("Failed to store user {}", user.username))?;
        drop(store);

        self.playlists
            .init_user(&user.id)
            .map_err(|err| anyhow!("Failed to init playlists of {}: {}", user.id, err))?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Same error for an unknown username and a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(UserError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let user = self
            .lock_store()?
            .find_user_by_username(username)?
            .ok_or(UserError::InvalidCredentials)?;
        if !user.password_hash.verify(password) {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool, UserError> {
        Ok(self.lock_store()?.find_user_by_username(username)?.is_some())
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, UserError> {
        Ok(self.lock_store()?.get_user(user_id)?)
    }
}
