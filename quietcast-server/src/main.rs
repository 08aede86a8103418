//! quietcast-server - Podcast platform HTTP service
//!
//! Episode upload/scheduling/publishing, the public listener feed, listener
//! accounts, change-detection polling, and the auto-publish sweep.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use quietcast_common::config;
use quietcast_common::db::init_database;
use quietcast_common::session::load_session_secret;
use quietcast_server::media::MediaClient;
use quietcast_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "quietcast-server", about = "Quietcast podcast platform server")]
struct Cli {
    /// Root folder holding the database and config.toml
    #[arg(long)]
    root: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Quietcast server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Root folder resolution: CLI > env > config file > OS default
    let root = config::resolve_root_folder(cli.root.as_deref());
    config::ensure_root_folder(&root)?;
    info!("Root folder: {}", root.display());

    let app_config = config::load_app_config(&root)?;

    let db_path = config::database_path(&root);
    let pool = init_database(&db_path).await?;

    // Session signing secret lives in the settings table; generated on
    // first run.
    let session_secret = load_session_secret(&pool).await?;

    if !app_config.media.is_configured() {
        warn!("Media store credentials missing; audio uploads will fail until configured");
    }
    let media = MediaClient::new(&app_config.media)?;

    let state = AppState::new(pool, media, session_secret);
    let app = build_router(state);

    let port = cli.port.unwrap_or(app_config.server.port);
    let addr = format!("{}:{}", app_config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("quietcast-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
