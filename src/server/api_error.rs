//! Conversion of domain errors into HTTP responses.

use crate::{
    api::ApiEnvelope,
    playlist::PlaylistError,
    upload::UploadError,
    user::UserError,
};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    TooLarge(String),
    UnsupportedType(String),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::TooLarge(_)
            | ApiError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("User not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Validation(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::TooLarge(m)
            | ApiError::UnsupportedType(m) => {
                debug!("Request failed with {}: {}", status, m);
                m
            }
        };
        (status, Json(ApiEnvelope::failure(message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(_) => ApiError::Validation(err.to_string()),
            UserError::UsernameTaken => ApiError::Conflict(err.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::Internal(inner) => ApiError::Internal(inner),
        }
    }
}

impl From<PlaylistError> for ApiError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::Validation(_) => ApiError::Validation(err.to_string()),
            PlaylistError::PlaylistNotFound | PlaylistError::SongNotFound => {
                ApiError::NotFound(err.to_string())
            }
            PlaylistError::DuplicateSong => ApiError::Conflict(err.to_string()),
            PlaylistError::Internal(inner) => ApiError::Internal(inner),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedFileType => ApiError::UnsupportedType(err.to_string()),
            UploadError::FileTooLarge(_) => ApiError::TooLarge(err.to_string()),
            UploadError::MissingFile => ApiError::Validation(err.to_string()),
            UploadError::Io(io) => ApiError::Internal(anyhow::Error::new(io)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}
