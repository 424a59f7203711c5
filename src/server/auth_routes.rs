//! Registration, login and username checks.
//!
//! Routes (nested under `/api/auth`):
//! - POST /register
//! - POST /login
//! - POST /logout
//! - GET /check-username/{username}

use super::{api_error::ApiError, state::*};
use crate::{
    api::{ApiEnvelope, ExistsPayload, LoginBody, NoPayload, UserPayload},
    user::{NewUser, UserView},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

async fn register(
    State(user_manager): State<GuardedUserManager>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_user) = body?;
    let user = user_manager.register(new_user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok_with_message(
            "User registered successfully",
            UserPayload {
                user: UserView::from(user),
            },
        )),
    ))
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let user = user_manager.authenticate(&body.username, &body.password)?;
    info!("User {} logged in", user.id);
    Ok(Json(ApiEnvelope::ok_with_message(
        "Login successful",
        UserPayload {
            user: UserView::from(user),
        },
    )))
}

/// There is no server-side session, so this only acknowledges.
async fn logout() -> impl IntoResponse {
    Json(ApiEnvelope::ok_with_message("Logout successful", NoPayload {}))
}

async fn check_username(
    State(user_manager): State<GuardedUserManager>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = user_manager.username_exists(&username)?;
    Ok(Json(ApiEnvelope::ok(ExistsPayload { exists })))
}

pub fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check-username/{username}", get(check_username))
}
