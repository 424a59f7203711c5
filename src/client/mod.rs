//! Rust client for the mixtape HTTP API.

mod api_client;
mod playlist_repository;

pub use api_client::{ApiClient, ApiResponse, NETWORK_ERROR_MESSAGE};
pub use playlist_repository::{PlaylistRepository, RepositoryError};
