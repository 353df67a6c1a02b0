//! Operator CLI for the link store.
//!
//! Talks to the same storage backend as the server, using the same
//! environment configuration, without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Verify the bucket is reachable
//! cargo run --bin storectl -- ping
//!
//! # Create and resolve links
//! cargo run --bin storectl -- shorten https://example.com/report/123
//! cargo run --bin storectl -- expand https://sho.rt/s/<token>
//!
//! # Remove a link
//! cargo run --bin storectl -- delete <token>
//!
//! # Sign a 15-minute direct upload URL
//! cargo run --bin storectl -- upload-url <key> --origin https://app.example.com
//! ```
//!
//! # Environment Variables
//!
//! - `STORAGE_BUCKET` (required) and the other storage settings read by the server

use bucket_shortener::application::services::LinkService;
use bucket_shortener::config::Config;
use bucket_shortener::infrastructure::storage::build_store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing stored links.
#[derive(Parser)]
#[command(name = "storectl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Check that the storage backend is reachable
    Ping,

    /// Store a long URL and print its short URL
    Shorten {
        /// The long URL to store
        long_url: String,
    },

    /// Print the long URL behind a short URL or token
    Expand {
        /// Short URL, /s/<token> path, or bare token
        short_url: String,
    },

    /// Delete the record behind a short URL or token
    Delete {
        /// Short URL, /s/<token> path, or bare token
        short_url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Sign a direct upload URL for an object key
    UploadUrl {
        /// Object key to upload
        key: String,

        /// Origin the upload will come from
        #[arg(short, long)]
        origin: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let store = build_store(&config.storage)
        .await
        .context("Failed to configure storage")?;
    let service = LinkService::from_config(store, &config);

    match cli.command {
        Commands::Ping => ping(&service).await?,
        Commands::Shorten { long_url } => shorten(&service, &long_url).await?,
        Commands::Expand { short_url } => expand(&service, &short_url).await?,
        Commands::Delete { short_url, yes } => delete(&service, &short_url, yes).await?,
        Commands::UploadUrl { key, origin } => upload_url(&service, &key, &origin).await?,
    }

    Ok(())
}

async fn ping(service: &LinkService) -> Result<()> {
    let backend = service.backend_name();

    match service.ping().await {
        Ok(()) => {
            println!("{} {} backend is reachable", "✓".green().bold(), backend.cyan());
            Ok(())
        }
        Err(e) => {
            println!("{} {} backend failed: {}", "✗".red().bold(), backend.cyan(), e);
            Err(e.into())
        }
    }
}

async fn shorten(service: &LinkService, long_url: &str) -> Result<()> {
    let short_url = service
        .shorten(long_url)
        .await
        .context("Failed to shorten URL")?;

    println!("{}", short_url.bright_yellow().bold());
    Ok(())
}

async fn expand(service: &LinkService, short_url: &str) -> Result<()> {
    let long_url = service
        .expand(short_url)
        .await
        .context("Failed to expand URL")?;

    if long_url.is_empty() {
        println!("{}", "(empty record)".dimmed());
    } else {
        println!("{}", long_url);
    }
    Ok(())
}

/// Deletes a record after confirmation.
///
/// Deletion is irreversible: the token cannot be recreated.
async fn delete(service: &LinkService, short_url: &str, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", short_url))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete(short_url)
        .await
        .context("Failed to delete link")?;

    println!("{}", "✓ Link deleted".green().bold());
    Ok(())
}

async fn upload_url(service: &LinkService, key: &str, origin: &str) -> Result<()> {
    let url = service
        .upload_url(key, origin)
        .await
        .context("Failed to sign upload URL")?;

    println!("{}", "Signed upload URL (valid 15 minutes):".bright_white());
    println!("{}", url);
    Ok(())
}
