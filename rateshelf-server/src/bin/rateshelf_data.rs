//! Snapshot export/import utility
//!
//! **Usage:**
//! ```bash
//! rateshelf-data export backup.json
//! rateshelf-data --database-url sqlite://./fresh.db?mode=rwc import backup.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rateshelf_common::config::{load_config_or_default, ServerConfig};
use rateshelf_server::db::{self, transfer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Export or import the whole store as JSON
#[derive(Parser, Debug)]
#[command(name = "rateshelf-data")]
#[command(version)]
struct Args {
    /// SQLite connection URL; defaults to the server's resolved database
    #[arg(long)]
    database_url: Option<String>,

    /// Path to config.toml
    #[arg(short, long, env = "RATESHELF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write every collection and rating to a JSON file
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Load a JSON snapshot into the store in one transaction
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rateshelf_server=info,rateshelf_data=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let toml = load_config_or_default(args.config.as_deref());
    let config = ServerConfig::resolve(args.database_url.as_deref(), None, &toml);

    let pool = db::init_database(&config.database_url)
        .await
        .context("Failed to open database")?;

    match args.command {
        Command::Export { file } => {
            let snapshot = transfer::export_snapshot(&pool)
                .await
                .context("Failed to read store")?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            std::fs::write(&file, json)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            info!("Snapshot written to {}", file.display());
        }
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: transfer::Snapshot =
                serde_json::from_str(&content).context("Snapshot is not valid JSON")?;
            let summary = transfer::import_snapshot(&pool, &snapshot)
                .await
                .context("Import failed, nothing was written")?;
            println!(
                "Imported {} collections and {} ratings",
                summary.collections, summary.ratings
            );
        }
    }

    pool.close().await;
    Ok(())
}
