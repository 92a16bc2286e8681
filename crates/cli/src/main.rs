//! flickrs demo entry point.
//!
//! Illustrative command-line front end for the cache: look up a photo, a
//! tag, or an album, and print the cached records as JSON. Logging goes to
//! stderr so stdout stays clean for the JSON output.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flickrs_client::{FlickrClient, FlickrConfig};
use flickrs_core::cache::label_for_suffix;
use flickrs_core::{AppConfig, CacheDb, PhotoCache};

#[derive(Parser)]
#[command(name = "flickrs", about = "Local persistent cache for Flickr metadata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch (or serve from cache) a photo with its sizes.
    Photo {
        /// Photo id.
        id: String,
        /// Pick the smallest size wider than this.
        #[arg(long)]
        width: Option<i64>,
        /// Pick the smallest size taller than this.
        #[arg(long)]
        height: Option<i64>,
        /// Pick a size by its URL suffix (e.g. "z" for Medium 640).
        #[arg(long, conflicts_with_all = ["width", "height"])]
        suffix: Option<String>,
    },
    /// Sync and list an owner's photos for a tag, newest first.
    Tagged {
        /// Tag to search for.
        tag: String,
        /// Owner nsid (defaults to the configured default user).
        #[arg(long)]
        user: Option<String>,
    },
    /// Sync and list an album's member photos, newest first.
    Album {
        /// Photoset id.
        id: String,
        /// Owner nsid (defaults to the configured default user).
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;
    let (api_key, api_secret) = config.require_credentials()?;

    let client = FlickrClient::new(FlickrConfig {
        timeout: config.timeout(),
        user_agent: config.user_agent.clone(),
        ..FlickrConfig::new(api_key, api_secret)
    })?;
    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let cache = PhotoCache::new(db, client, config.default_user.clone());

    match cli.command {
        Command::Photo { id, width, height, suffix } => {
            let photo = cache.get_photo(&id).await?;
            println!("{}", serde_json::to_string_pretty(&photo)?);

            let sizes = cache.db().sizes_for_photo(&id).await?;
            println!("{}", serde_json::to_string_pretty(&sizes)?);

            let url = match suffix {
                Some(suffix) => {
                    let label = label_for_suffix(&suffix)
                        .ok_or_else(|| anyhow!("unknown size suffix: {suffix}"))?;
                    cache.db().best_size_url(&id, None, None, Some(label)).await?
                }
                None => cache.get_photo_url(&id, width, height).await?,
            };
            match url {
                Some(url) => println!("{url}"),
                None => println!("no matching size"),
            }
            println!("{}", cache.get_photo_page_url(&id).await?);
        }
        Command::Tagged { tag, user } => {
            let photos = cache.get_tagged_photos(&tag, user.as_deref()).await?;
            tracing::info!(count = photos.len(), %tag, "tagged photos");
            println!("{}", serde_json::to_string_pretty(&photos)?);
        }
        Command::Album { id, user } => {
            let photos = cache.get_album(&id, user.as_deref()).await?;
            tracing::info!(count = photos.len(), album = %id, "album photos");
            println!("{}", serde_json::to_string_pretty(&photos)?);
        }
    }

    Ok(())
}
