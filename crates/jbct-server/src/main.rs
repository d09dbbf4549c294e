//! JBCT Backend Server
//!
//! OAuth sign-in, session cookies and the API-key gate over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use jbct_core::config::load_config;
use jbct_core::tracing_init::init_tracing;
use jbct_server::blacklist::RedisBlacklist;
use jbct_server::oauth::{ProviderRegistry, build_http_client};
use jbct_server::server::{AppState, router};
use jbct_server::storage::UserDatabase;

#[derive(Parser, Debug)]
#[command(name = "jbct-server")]
#[command(version, about = "JBCT backend - OAuth login and session API")]
struct Args {
    /// Optional JSON settings file, applied before environment variables.
    #[arg(long, env = "JBCT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides `PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let args = Args::parse();

    init_tracing("jbct_server=info,tower_http=info", args.log_json);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        environment = ?config.environment,
        dotenv = dotenv_loaded,
        "Starting jbct-server"
    );

    let db = UserDatabase::connect(&config.postgres).await?;
    let blacklist = RedisBlacklist::connect(&config.redis).await?;

    let http = build_http_client()?;
    let providers = ProviderRegistry::from_config(&config, &http);
    if providers.is_empty() {
        warn!("No OAuth provider enabled; every login route will 404");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, Arc::new(db.clone()), Arc::new(blacklist), providers);
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
