//! JSON bodies exchanged over HTTP, shared by the server and the client.
//!
//! Every response is an [`ApiEnvelope`]: `success`, an optional `message` and
//! the payload fields inlined next to them, e.g.
//! `{"success": true, "playlist": {...}}`.

use crate::{
    playlist::{Playlist, Song},
    user::UserView,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(payload: T) -> Self {
        ApiEnvelope {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn ok_with_message<S: Into<String>>(message: S, payload: T) -> Self {
        ApiEnvelope {
            success: true,
            message: Some(message.into()),
            payload,
        }
    }
}

impl ApiEnvelope<NoPayload> {
    pub fn failure<S: Into<String>>(message: S) -> Self {
        ApiEnvelope {
            success: false,
            message: Some(message.into()),
            payload: NoPayload {},
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct NoPayload {}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct UserPayload {
    pub user: UserView,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ExistsPayload {
    pub exists: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PlaylistsPayload {
    pub playlists: Vec<Playlist>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PlaylistPayload {
    pub playlist: Playlist,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SongPayload {
    pub song: Song,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct CreatePlaylistBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct UpdateRatingBody {
    pub rating: i64,
}
