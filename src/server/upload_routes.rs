//! MP3 upload route, nested under `/api/upload`.
//!
//! - POST /{user_id}/{playlist_id} - multipart with a single `mp3file` field

use super::{api_error::ApiError, playlist_routes::ensure_user_exists, state::*};
use crate::{
    api::{ApiEnvelope, SongPayload},
    ids::generate_local_song_id,
    playlist::{NewSong, LOCAL_SONG_DURATION, LOCAL_SONG_THUMBNAIL},
    upload::{is_mp3, title_from_file_name, StoredUpload, UploadError},
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

pub const UPLOAD_FIELD_NAME: &str = "mp3file";

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

fn multipart_error(err: MultipartError, max_upload_bytes: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadError::FileTooLarge(max_upload_bytes).into();
    }
    ApiError::Validation(format!("Invalid multipart body: {}", err.body_text()))
}

/// Reads the first `mp3file` field into the uploads directory.
/// Other fields are skipped.
async fn receive_file(
    state: &ServerState,
    multipart: &mut Multipart,
) -> Result<StoredUpload, ApiError> {
    let uploads = state.playlist_manager.uploads();
    let max = uploads.max_file_size();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, max))?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_mp3(&file_name, field.content_type()) {
            return Err(UploadError::UnsupportedFileType.into());
        }

        let mut pending = uploads.begin(&file_name)?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(err, max))?
        {
            pending.write_chunk(&chunk)?;
        }
        debug!("Received {} ({} bytes)", file_name, pending.written());
        return Ok(pending.finish()?);
    }
    Err(UploadError::MissingFile.into())
}

async fn upload_mp3(
    State(state): State<ServerState>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::from(UploadError::MissingFile))?;
    ensure_user_exists(&state, &user_id)?;

    let stored = receive_file(&state, &mut multipart).await?;
    let public_path = stored.public_path();
    let new_song = NewSong {
        local_id: Some(generate_local_song_id()),
        file_path: Some(public_path.clone()),
        title: title_from_file_name(&stored.original_name),
        thumbnail: Some(LOCAL_SONG_THUMBNAIL.to_string()),
        duration: Some(LOCAL_SONG_DURATION.to_string()),
        ..Default::default()
    };

    let song = match state
        .playlist_manager
        .add_song(&user_id, &playlist_id, new_song)
    {
        Ok(song) => song,
        Err(err) => {
            state.playlist_manager.uploads().remove(&public_path);
            return Err(err.into());
        }
    };
    info!(
        "User {} uploaded {} into playlist {}",
        user_id, stored.file_name, playlist_id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok_with_message(
            "File uploaded successfully",
            SongPayload { song },
        )),
    ))
}

pub fn upload_routes(max_upload_bytes: u64) -> Router<ServerState> {
    let body_limit =
        usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX);
    Router::new()
        .route("/{user_id}/{playlist_id}", post(upload_mp3))
        .layer(DefaultBodyLimit::max(body_limit))
}
