pub mod auth;
mod json_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{MixtapeHasher, PasswordCredentials};
pub use json_user_store::{JsonUserStore, USERS_FILE_NAME};
pub use user_manager::{UserError, UserManager};
pub use user_models::{NewUser, User, UserView};
pub use user_store::UserStore;
