//! Generated identifiers.
//!
//! Ids are `<prefix>_<unix millis>_<8 hex chars>`, which keeps them sortable by
//! creation time while staying collision resistant within one millisecond.

use chrono::Utc;
use uuid::Uuid;

pub const USER_ID_PREFIX: &str = "user";
pub const PLAYLIST_ID_PREFIX: &str = "playlist";
pub const LOCAL_SONG_ID_PREFIX: &str = "local";

fn short_uuid() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub fn generate_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        short_uuid()
    )
}

pub fn generate_user_id() -> String {
    generate_id(USER_ID_PREFIX)
}

pub fn generate_playlist_id() -> String {
    generate_id(PLAYLIST_ID_PREFIX)
}

pub fn generate_local_song_id() -> String {
    generate_id(LOCAL_SONG_ID_PREFIX)
}

/// Name under which an uploaded file is stored, `<millis>-<uuid><extension>`.
/// `extension` includes the leading dot, or is empty.
pub fn generate_upload_file_name(extension: &str) -> String {
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        extension
    )
}

/// Ids end up in file names, so only a conservative charset is accepted.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
