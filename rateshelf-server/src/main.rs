//! rateshelf-server - REST API for collections and ratings
//!
//! Settings resolve CLI > environment > config.toml > defaults.

use anyhow::{Context, Result};
use clap::Parser;
use rateshelf_common::config::{load_config_or_default, ServerConfig};
use rateshelf_server::{build_router, db, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rateshelf-server")]
#[command(about = "Collections and ratings REST API")]
#[command(version)]
struct Args {
    /// SQLite connection URL (e.g. sqlite://./rateshelf.db?mode=rwc or sqlite::memory:)
    #[arg(long)]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(short, long)]
    listen_addr: Option<String>,

    /// Path to config.toml
    #[arg(short, long, env = "RATESHELF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let log_from_env = from_env.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        from_env.unwrap_or_else(|| "rateshelf_server=info,tower_http=debug".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let toml = load_config_or_default(args.config.as_deref());

    // RUST_LOG wins over the [logging] table
    if !log_from_env {
        let directives = format!(
            "rateshelf_server={0},rateshelf_common={0},tower_http=debug",
            toml.logging.level
        );
        if let Err(e) = filter_handle.reload(EnvFilter::new(directives)) {
            error!("Failed to apply configured log level: {}", e);
        }
    }

    info!("Starting rateshelf-server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::resolve(
        args.database_url.as_deref(),
        args.listen_addr.as_deref(),
        &toml,
    );
    info!("Database: {}", config.database_url);

    let pool = db::init_database(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let app = build_router(AppState::new(pool));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("rateshelf-server listening on http://{}", config.listen_addr);
    info!("Health check: http://{}/health", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
