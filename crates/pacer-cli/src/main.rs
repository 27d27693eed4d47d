//! pacer - activity tracker with manager approvals
//!
//! Every invocation pulls the shared blobs, runs one command against the
//! in-memory workspace, and pushes the full activity collection back if
//! the command changed anything.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacer_core::{PacerConfig, SystemClock};
use pacer_sync::{FsBlobStore, SyncCoordinator, SyncSettings};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// pacer - activity tracker with manager approvals
#[derive(Parser, Debug)]
#[command(name = "pacer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults apply if it does not exist.
    #[arg(short, long, default_value = "pacer.toml")]
    config: PathBuf,

    /// Directory holding the shared blobs (overrides `store.root`).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset (overrides `log.level`).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Queries ===
    /// List activities.
    #[command(alias = "ls")]
    List(commands::activity::ListArgs),

    /// Show one activity with its derived timings.
    Show(commands::activity::ShowArgs),

    // === Mutations ===
    /// Create a pending activity.
    Add(commands::activity::AddArgs),

    /// Start a pending activity.
    Start(commands::activity::IdArg),

    /// Ask the manager to accept a running activity as done.
    Request(commands::activity::OutcomeArgs),

    /// Approve a pending completion.
    Approve(commands::activity::IdArg),

    /// Send a pending completion back to running.
    Reject(commands::activity::IdArg),

    /// Cancel an activity that has not reached approval.
    Cancel(commands::activity::IdArg),

    /// Complete an activity without an approval round.
    Complete(commands::activity::OutcomeArgs),

    // === Synchronization ===
    /// Upload pending changes and download the latest state once.
    Sync,

    /// Keep syncing on the configured interval until interrupted.
    Watch(commands::sync::WatchArgs),
}

fn load_config(path: &Path) -> Result<PacerConfig> {
    if path.exists() {
        PacerConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    } else {
        debug!(path = %path.display(), "configuration file not found, using defaults");
        Ok(PacerConfig::default())
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(root) = cli.store {
        config.store.root = root;
    }
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log.level));

    let store = FsBlobStore::new(config.store.root.clone())
        .with_max_blob_bytes(config.store.max_blob_bytes);
    let mut coordinator = SyncCoordinator::new(
        Arc::new(store),
        SyncSettings::from_config(&config.store),
        Arc::new(SystemClock),
    );

    match cli.command {
        Commands::List(args) => commands::activity::list(&mut coordinator, &args).await,
        Commands::Show(args) => commands::activity::show(&mut coordinator, &args).await,
        Commands::Add(args) => commands::activity::add(&mut coordinator, &args).await,
        Commands::Start(args) => commands::activity::start(&mut coordinator, &args).await,
        Commands::Request(args) => commands::activity::request(&mut coordinator, &args).await,
        Commands::Approve(args) => commands::activity::approve(&mut coordinator, &args).await,
        Commands::Reject(args) => commands::activity::reject(&mut coordinator, &args).await,
        Commands::Cancel(args) => commands::activity::cancel(&mut coordinator, &args).await,
        Commands::Complete(args) => commands::activity::complete(&mut coordinator, &args).await,
        Commands::Sync => commands::sync::sync_once(&mut coordinator).await,
        Commands::Watch(args) => commands::sync::watch(coordinator, &config, &args).await,
    }
}
