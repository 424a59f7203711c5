//! Mixtape Server Library
//!
//! Playlist manager backend: users, playlists of remote videos and uploaded
//! MP3 files, persisted as JSON documents, plus a Rust client for its API.

pub mod api;
pub mod client;
pub mod config;
pub mod ids;
pub mod json_persistence;
pub mod playlist;
pub mod server;
pub mod upload;
pub mod user;

// Re-export commonly used types for convenience
pub use client::{ApiClient, PlaylistRepository};
pub use playlist::{NewSong, Playlist, PlaylistManager, Song, SongOrder, SongSource};
pub use server::{run_server, RequestsLoggingLevel};
pub use user::{UserManager, UserView};
