//! Playlist and song routes, nested under `/api/playlists`.

use super::{api_error::ApiError, state::*};
use crate::{
    api::{
        ApiEnvelope, CreatePlaylistBody, NoPayload, PlaylistPayload, PlaylistsPayload,
        SongPayload, UpdateRatingBody,
    },
    playlist::NewSong,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};

/// Playlist routes address users by id, so make sure the user is real.
pub(super) fn ensure_user_exists(state: &ServerState, user_id: &str) -> Result<(), ApiError> {
    match state.user_manager.get_user(user_id)? {
        Some(_) => Ok(()),
        None => Err(ApiError::user_not_found()),
    }
}

async fn get_playlists(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    let playlists = state.playlist_manager.get_playlists(&user_id)?;
    Ok(Json(ApiEnvelope::ok(PlaylistsPayload { playlists })))
}

async fn create_playlist(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    body: Result<Json<CreatePlaylistBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    ensure_user_exists(&state, &user_id)?;
    let playlist = state.playlist_manager.create_playlist(&user_id, &body.name)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(PlaylistPayload { playlist })),
    ))
}

async fn delete_playlist(
    State(state): State<ServerState>,
    Path((user_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    state
        .playlist_manager
        .delete_playlist(&user_id, &playlist_id)?;
    Ok(Json(ApiEnvelope::ok_with_message(
        "Playlist deleted successfully",
        NoPayload {},
    )))
}

async fn add_song(
    State(state): State<ServerState>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    body: Result<Json<NewSong>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_song) = body?;
    ensure_user_exists(&state, &user_id)?;
    let song = state
        .playlist_manager
        .add_song(&user_id, &playlist_id, new_song)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(SongPayload { song })),
    ))
}

async fn remove_song(
    State(state): State<ServerState>,
    Path((user_id, playlist_id, song_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    state
        .playlist_manager
        .remove_song(&user_id, &playlist_id, &song_id)?;
    Ok(Json(ApiEnvelope::ok_with_message(
        "Song removed from playlist",
        NoPayload {},
    )))
}

async fn update_rating(
    State(state): State<ServerState>,
    Path((user_id, playlist_id, song_id)): Path<(String, String, String)>,
    body: Result<Json<UpdateRatingBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    ensure_user_exists(&state, &user_id)?;
    state
        .playlist_manager
        .update_rating(&user_id, &playlist_id, &song_id, body.rating)?;
    Ok(Json(ApiEnvelope::ok_with_message(
        "Rating updated",
        NoPayload {},
    )))
}

pub fn playlist_routes() -> Router<ServerState> {
    Router::new()
        .route("/{user_id}", get(get_playlists).post(create_playlist))
        .route("/{user_id}/{playlist_id}", delete(delete_playlist))
        .route("/{user_id}/{playlist_id}/songs", post(add_song))
        .route(
            "/{user_id}/{playlist_id}/songs/{song_id}",
            delete(remove_song),
        )
        .route(
            "/{user_id}/{playlist_id}/songs/{song_id}/rating",
            patch(update_rating),
        )
}
