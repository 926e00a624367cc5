//! rateshelf - terminal front end for a rateshelf-server
//!
//! **Usage:**
//! ```bash
//! rateshelf collections
//! rateshelf new-collection Movies --description "Feature films"
//! rateshelf show <collection-id> --search heat --sort rating
//! rateshelf rate <collection-id> --name Arrival --rating 9 --review Great --image poster.png
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rateshelf_client::picture::ImageFile;
use rateshelf_client::ratings::FormField;
use rateshelf_client::{ApiClient, CollectionsStore, Confirm, RatingsStore, SortMode};
use rateshelf_common::config::{load_config_or_default, ClientConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rateshelf")]
#[command(about = "Browse and edit collections and ratings")]
#[command(version)]
struct Args {
    /// Base URL of the rateshelf-server API
    #[arg(long, env = "RATESHELF_API_URL")]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(short, long, env = "RATESHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List collections with their rating counts
    Collections,
    /// Create a collection
    NewCollection {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or redescribe a collection
    EditCollection {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a collection together with all its ratings
    DeleteCollection { id: String },
    /// Show a collection's ratings with statistics
    Show {
        collection_id: String,
        /// Case-insensitive filter on name and review
        #[arg(short, long, default_value = "")]
        search: String,
        /// name, name-desc, rating, rating-low, newest or oldest
        #[arg(long, default_value_t = SortMode::Newest)]
        sort: SortMode,
    },
    /// Add a rating to a collection
    Rate {
        collection_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        rating: String,
        #[arg(long)]
        review: String,
        /// Picture to attach (downscaled and sent as JPEG)
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change fields of an existing rating
    EditRating {
        collection_id: String,
        rating_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        rating: Option<String>,
        #[arg(long)]
        review: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a rating
    DeleteRating {
        collection_id: String,
        rating_id: String,
    },
}

/// Confirmation read from stdin unless `--yes` was given
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rateshelf_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let toml = load_config_or_default(args.config.as_deref());
    let config = ClientConfig::resolve(args.api_url.as_deref(), &toml);
    let api = ApiClient::new(&config.api_url).context("Failed to build HTTP client")?;
    let prompt = Prompt {
        assume_yes: args.yes,
    };

    match args.command {
        Command::Collections => {
            let store = CollectionsStore::new(api);
            store.init().await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
            for collection in &state.collections {
                let marker = if state.selected_id() == Some(collection.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {:<24} {:>4} ratings  {}",
                    marker, collection.id, collection.name, collection.rating_count,
                    collection.description
                );
            }
        }
        Command::NewCollection { name, description } => {
            let store = CollectionsStore::new(api);
            let created = store.create(&name, description.as_deref()).await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
            if let Ok(collection) = created {
                println!("{}", collection.id);
            }
        }
        Command::EditCollection {
            id,
            name,
            description,
        } => {
            let store = CollectionsStore::new(api);
            store.update(&id, name.as_deref(), description.as_deref()).await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
        }
        Command::DeleteCollection { id } => {
            let store = CollectionsStore::new(api);
            store.delete(&id, &prompt).await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
        }
        Command::Show {
            collection_id,
            search,
            sort,
        } => {
            let store = RatingsStore::new(api);
            store.set_collection(Some(&collection_id)).await;
            store.set_search(&search).await;
            store.set_sort(sort).await;
            let state = store.snapshot().await;
            report(None, state.messages.error())?;

            for rating in state.view() {
                let date = rating
                    .created_at
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let picture = if rating.picture.is_empty() { " " } else { "▣" };
                println!(
                    "{} {:>4.1}  {:<24} {}  {}  {}",
                    picture, rating.rating, rating.name, date, rating.id, rating.review
                );
            }
            let stats = state.stats();
            println!(
                "\n{} ratings  mean {:.2}  median {:.2}  high {:.1}  low {:.1}",
                stats.total, stats.mean, stats.median, stats.highest, stats.lowest
            );
        }
        Command::Rate {
            collection_id,
            name,
            rating,
            review,
            image,
        } => {
            let store = RatingsStore::new(api);
            store.set_collection(Some(&collection_id)).await;
            attach_image(&store, image.as_deref()).await?;
            store.edit_field(FormField::Name(name)).await;
            set_rating(&store, &rating).await?;
            store.edit_field(FormField::Review(review)).await;
            store.submit().await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
        }
        Command::EditRating {
            collection_id,
            rating_id,
            name,
            rating,
            review,
            image,
        } => {
            let store = RatingsStore::new(api);
            store.set_collection(Some(&collection_id)).await;
            let state = store.snapshot().await;
            report(None, state.messages.error())?;
            let Some(existing) = state.items.into_iter().find(|r| r.id == rating_id) else {
                bail!("Rating {} not found in collection {}", rating_id, collection_id);
            };

            store.start_edit(existing).await;
            attach_image(&store, image.as_deref()).await?;
            if let Some(name) = name {
                store.edit_field(FormField::Name(name)).await;
            }
            if let Some(rating) = rating {
                set_rating(&store, &rating).await?;
            }
            if let Some(review) = review {
                store.edit_field(FormField::Review(review)).await;
            }
            store.submit().await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
        }
        Command::DeleteRating {
            collection_id,
            rating_id,
        } => {
            let store = RatingsStore::new(api);
            store.set_collection(Some(&collection_id)).await;
            store.delete(&rating_id, &prompt).await;
            let state = store.snapshot().await;
            report(state.messages.success(), state.messages.error())?;
        }
    }

    Ok(())
}

/// Print the container's messages; an error message fails the command
fn report(success: Option<&str>, error: Option<&str>) -> Result<()> {
    if let Some(error) = error {
        bail!("{}", error);
    }
    if let Some(success) = success {
        println!("{}", success);
    }
    Ok(())
}

async fn attach_image(
    store: &RatingsStore<ApiClient>,
    path: Option<&std::path::Path>,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = ImageFile::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !store.ingest_image(file).await {
        let state = store.snapshot().await;
        report(None, state.messages.error())?;
    }
    Ok(())
}

/// The form ignores out-of-range input; surface that instead of saving the old value
async fn set_rating(store: &RatingsStore<ApiClient>, raw: &str) -> Result<()> {
    store.edit_field(FormField::Rating(raw.to_string())).await;
    let applied = store.snapshot().await.form.rating;
    if raw.trim().parse::<f64>().ok() != Some(applied) {
        bail!("Rating must be between 0 and 10");
    }
    Ok(())
}
