//! Command-line front end for Shelf.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use shelf_core::AssetId;
use shelf_core::config::AppConfig;
use shelf_library::Library;
use shelf_metadata::BookRecord;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shelfctl")]
#[command(about = "Manage a local Shelf book library")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "SHELF_CONFIG",
        default_value = "config/shelf.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Write a file into the asset store under an id
    Save {
        id: String,
        file: PathBuf,
    },
    /// Print a book's content (asset, or inline payload if not yet migrated)
    Read {
        id: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete an asset, leaving its record alone
    Delete { id: String },
    /// Show storage usage
    Usage,
    /// Move inline payloads into the asset store
    Migrate,
    /// Add a book from a file
    Import {
        file: PathBuf,
        /// Book id (default: file stem)
        #[arg(long)]
        id: Option<String>,
        /// Title attribute
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a book and its asset
    Remove { id: String },
    /// Remove every book and its asset
    Clear {
        /// Required; the library cannot be recovered afterwards
        #[arg(long)]
        yes: bool,
    },
    /// Write a backup of the whole library
    Export { file: PathBuf },
    /// Restore books from a backup
    Restore { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli { config, command } = Cli::parse();

    let mut config = load_config(&config)?;
    if command == Commands::Migrate {
        // Run explicitly below so the report can be printed.
        config.migration.run_on_startup = false;
    }

    let library = Library::open(&config)
        .await
        .context("failed to open library")?;

    run(&library, command).await
}

/// Load configuration from an optional TOML file, overridden by `SHELF_*`
/// environment variables (`__` separates nested keys).
fn load_config(path: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if path.exists() {
        tracing::debug!(config_path = %path.display(), "loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!(config_path = %path.display(), "no config file, using defaults");
    }

    figment = figment.merge(Env::prefixed("SHELF_").ignore(&["config"]).split("__"));

    let config: AppConfig = figment
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    Ok(config)
}

async fn run(library: &Library, command: Commands) -> Result<()> {
    match command {
        Commands::Save { id, file } => {
            let id = parse_id(&id)?;
            let data = read_file(&file).await?;
            let size = data.len();
            library
                .assets()
                .save(&id, data)
                .await
                .with_context(|| format!("failed to save asset {id}"))?;
            println!("saved {id} ({size} bytes)");
        }
        Commands::Read { id, output } => {
            let id = parse_id(&id)?;
            let content = library
                .load_book_content(&id)
                .await
                .with_context(|| format!("failed to read {id}"))?;
            match output {
                Some(path) => tokio::fs::write(&path, &content)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&content).await?;
                    stdout.flush().await?;
                }
            }
        }
        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            library
                .assets()
                .delete(&id)
                .await
                .with_context(|| format!("failed to delete asset {id}"))?;
            println!("deleted asset {id}");
        }
        Commands::Usage => {
            let usage = library.usage().await;
            println!(
                "{}",
                serde_json::json!({
                    "used_bytes": usage.used_bytes,
                    "quota_bytes": usage.quota_bytes,
                })
            );
        }
        Commands::Migrate => {
            let report = library.migrate().await.context("migration failed")?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Commands::Import { file, id, title } => {
            let id = match id {
                Some(id) => parse_id(&id)?,
                None => id_from_file(&file)?,
            };
            let data = read_file(&file).await?;
            let mut record = BookRecord::new(id.clone());
            if let Some(title) = title {
                record = record.with_attribute("title", title);
            }
            library
                .import_book(record, data)
                .await
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!("imported {id}");
        }
        Commands::Remove { id } => {
            let id = parse_id(&id)?;
            library
                .delete_book(&id)
                .await
                .with_context(|| format!("failed to remove book {id}"))?;
            println!("removed {id}");
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the library without --yes");
            }
            let removed = library.clear().await.context("failed to clear library")?;
            println!("removed {removed} books");
        }
        Commands::Export { file } => {
            let document = library.export_backup().await.context("export failed")?;
            tokio::fs::write(&file, &document)
                .await
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("wrote backup to {}", file.display());
        }
        Commands::Restore { file } => {
            let document = read_file(&file).await?;
            let report = library
                .restore_backup(&document)
                .await
                .context("restore failed")?;
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

fn parse_id(id: &str) -> Result<AssetId> {
    AssetId::new(id).with_context(|| format!("invalid book id {id:?}"))
}

fn id_from_file(path: &Path) -> Result<AssetId> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("cannot derive an id from {}", path.display()))?;
    parse_id(stem)
}

async fn read_file(path: &Path) -> Result<Bytes> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Bytes::from(data))
}
