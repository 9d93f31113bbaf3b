//! Folder tree sync daemon.
//!
//! Connects to the remote store, keeps a folder snapshot fresh on a timer,
//! and logs each rebuilt snapshot until it is told to stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_remote::HttpStore;
use foldertree_service::{SyncCoordinator, TreeIndex, spawn_refresher};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Sync error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FOLDERTREE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting foldertree-sync v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Remote store ─────────────────────────────────────
    tracing::info!(base_url = %config.remote.base_url, "Connecting to remote store...");
    let store = Arc::new(HttpStore::new(&config.remote)?);
    let coordinator = SyncCoordinator::with_store(store, config.sync.delete_policy);

    // ── Step 2: Initial snapshot ─────────────────────────────────
    match coordinator.refresh().await {
        Ok(index) => log_snapshot(&index),
        Err(e) => tracing::warn!(error = %e, "Initial snapshot failed, retrying on the timer"),
    }

    // ── Step 3: Background tasks ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresher_handle = spawn_refresher(
        coordinator.clone(),
        Duration::from_secs(config.sync.refresh_interval_seconds),
        shutdown_rx.clone(),
    );
    if refresher_handle.is_none() {
        tracing::info!("Periodic refresh disabled (refresh_interval_seconds = 0)");
    }

    let watcher_handle = tokio::spawn(watch_snapshots(coordinator.subscribe(), shutdown_rx));

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = refresher_handle {
        let _ = tokio::time::timeout(Duration::from_secs(10), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;

    tracing::info!("foldertree-sync shut down gracefully");
    Ok(())
}

/// Log every published snapshot until shutdown
async fn watch_snapshots(
    mut snapshots: watch::Receiver<Arc<TreeIndex>>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let index = Arc::clone(&snapshots.borrow_and_update());
                log_snapshot(&index);
            }
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
            }
        }
    }
}

fn log_snapshot(index: &TreeIndex) {
    tracing::info!(
        folders = index.len(),
        roots = index.roots().len(),
        unreachable = index.unreachable().len(),
        "Folder snapshot"
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
