use super::user_models::User;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Returns every registered user, in registration order.
    /// Returns Err if the backing storage cannot be read.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Returns the user whose username matches, ignoring case.
    /// Returns Ok(None) if the user does not exist.
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Appends a new user. Uniqueness is checked by the caller.
    fn insert_user(&self, user: User) -> Result<()>;
}
