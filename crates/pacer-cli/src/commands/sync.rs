//! Synchronization commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use pacer_core::PacerConfig;
use pacer_core::config::{MAX_SYNC_INTERVAL_SECS, MIN_SYNC_INTERVAL_SECS};
use pacer_sync::{SyncCoordinator, spawn_periodic_sync};
use tokio::sync::{Mutex, watch};
use tracing::info;

/// Arguments for `pacer watch`.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between syncs (overrides `sync.interval_secs`).
    #[arg(long)]
    pub interval: Option<u64>,
}

/// Execute `pacer sync`.
pub async fn sync_once(coordinator: &mut SyncCoordinator) -> Result<()> {
    let summary = coordinator.sync().await.context("sync failed")?;

    if let Some(pushed) = summary.pushed {
        println!("Uploaded {} activities ({} bytes)", pushed.records, pushed.bytes);
    }
    let pulled = summary.pulled;
    println!(
        "Downloaded {} teams, {} members, {} activities",
        pulled.teams, pulled.members, pulled.activities
    );
    if pulled.skipped_rows() > 0 {
        println!(
            "Skipped {} malformed rows ({} roster, {} activity)",
            pulled.skipped_rows(),
            pulled.skipped_members.len(),
            pulled.skipped_activities.len()
        );
    }
    Ok(())
}

/// Execute `pacer watch`.
///
/// Runs the periodic sync until Ctrl-C, then lets the in-flight cycle
/// finish before returning.
pub async fn watch(
    coordinator: SyncCoordinator,
    config: &PacerConfig,
    args: &WatchArgs,
) -> Result<()> {
    let interval = match args.interval {
        Some(secs) if !(MIN_SYNC_INTERVAL_SECS..=MAX_SYNC_INTERVAL_SECS).contains(&secs) => {
            bail!(
                "--interval must be between {MIN_SYNC_INTERVAL_SECS} and {MAX_SYNC_INTERVAL_SECS} seconds"
            );
        },
        Some(secs) => Duration::from_secs(secs),
        None => config.sync.interval(),
    };

    let coordinator = Arc::new(Mutex::new(coordinator));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = spawn_periodic_sync(Arc::clone(&coordinator), interval, shutdown_rx);
    info!(interval_secs = interval.as_secs(), "watching for changes (Ctrl-C to stop)");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    // The receiver only disappears if the task already exited.
    let _ = shutdown_tx.send(true);
    handle.await.context("sync task panicked")?;
    Ok(())
}
