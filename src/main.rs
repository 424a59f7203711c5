use anyhow::{Context, Result};
use clap::Parser;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mixtape_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT,
};
use mixtape_server::server::{run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "mixtape-server", version, about = "Playlist manager server")]
struct CliArgs {
    /// Directory holding users.json, playlists/ and uploads/.
    #[clap(long, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[clap(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Static frontend to serve at `/`, with index.html as fallback.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    #[clap(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: u64,

    /// TOML file whose values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            data_dir: self.data_dir.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            max_upload_mb: self.max_upload_mb,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!(
        "Starting mixtape-server {} (requests logging: {}, max upload: {}MB)",
        env!("CARGO_PKG_VERSION"),
        app_config.logging_level,
        app_config.max_upload_mb
    );

    run_server(app_config.server_config(), &app_config.data_dir).await
}
