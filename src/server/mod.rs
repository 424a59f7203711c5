mod api_error;
mod auth_routes;
pub mod config;
mod http_layers;
mod playlist_routes;
pub mod server;
pub mod state;
mod upload_routes;

pub use api_error::ApiError;
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, open_managers, run_server};
pub use upload_routes::UPLOAD_FIELD_NAME;
