use anyhow::{Context, Result};
use std::{path::Path, sync::Arc, time::Duration};

use tracing::info;

use crate::{
    playlist::{JsonPlaylistStore, PlaylistManager},
    upload::{UploadStore, UPLOADS_URL_PREFIX},
    user::{JsonUserStore, UserManager},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::{
    auth_routes::auth_routes, log_requests, playlist_routes::playlist_routes, state::*,
    upload_routes::upload_routes, ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Opens the JSON stores under `data_dir`, creating the layout if needed:
/// `users.json`, `playlists/`, `uploads/` and `upload-staging/`.
pub fn open_managers(
    data_dir: &Path,
    max_upload_bytes: u64,
) -> Result<(GuardedUserManager, GuardedPlaylistManager)> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data dir {:?}", data_dir))?;

    let uploads = Arc::new(UploadStore::in_data_dir(data_dir, max_upload_bytes));
    uploads
        .init()
        .with_context(|| format!("Failed to create uploads dir {:?}", uploads.dir()))?;

    let playlist_manager = Arc::new(PlaylistManager::new(
        Box::new(JsonPlaylistStore::open(data_dir)?),
        uploads,
    ));
    let user_manager = Arc::new(UserManager::new(
        Box::new(JsonUserStore::open(data_dir)?),
        playlist_manager.clone(),
    ));
    Ok((user_manager, playlist_manager))
}

pub fn make_app(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    playlist_manager: GuardedPlaylistManager,
) -> Result<Router> {
    let uploads_dir = playlist_manager.uploads().dir().to_path_buf();
    let state = ServerState::new(config.clone(), user_manager, playlist_manager);

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let index = Path::new(frontend_path).join("index.html");
            let static_files_service = ServeDir::new(frontend_path)
                .append_index_html_on_directories(true)
                .fallback(ServeFile::new(index));
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let api_routes: Router = Router::new()
        .nest("/auth", auth_routes())
        .nest("/playlists", playlist_routes())
        .nest("/upload", upload_routes(config.max_upload_bytes))
        .with_state(state.clone());

    let app: Router = home_router
        .nest("/api", api_routes)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(uploads_dir))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_server(config: ServerConfig, data_dir: &Path) -> Result<()> {
    let (user_manager, playlist_manager) = open_managers(data_dir, config.max_upload_bytes)?;
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, user_manager, playlist_manager)?;

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!("Data directory: {:?}", data_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
