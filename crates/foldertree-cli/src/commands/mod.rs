//! CLI command definitions and dispatch.

pub mod folder;
pub mod video;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use foldertree_core::config::AppConfig;
use foldertree_core::error::{AppError, ErrorKind};
use foldertree_core::types::FolderId;
use foldertree_remote::HttpStore;
use foldertree_service::{MutationError, SyncCoordinator};

/// Browse and reorganize the video folder tree
#[derive(Debug, Parser)]
#[command(name = "foldertree", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder management
    Folder(folder::FolderArgs),
    /// Video listing
    Video(video::VideoArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Folder(args) => folder::execute(args, config, self.format).await,
            Commands::Video(args) => video::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the remote store and load the first snapshot
pub async fn connect(config: &AppConfig) -> Result<SyncCoordinator, AppError> {
    tracing::debug!(base_url = %config.remote.base_url, "Connecting to remote store");
    let store = Arc::new(HttpStore::new(&config.remote)?);
    let coordinator = SyncCoordinator::with_store(store, config.sync.delete_policy);
    coordinator.refresh().await?;
    Ok(coordinator)
}

/// Helper: parse a folder id argument
pub fn parse_folder_id(raw: &str) -> Result<FolderId, AppError> {
    raw.parse()
        .map_err(|e| AppError::validation(format!("Invalid folder ID '{}': {}", raw, e)))
}

/// Helper: turn a mutation failure into an error carrying its user message
pub fn mutation_failed(err: MutationError) -> AppError {
    let kind = match &err {
        MutationError::Rejected(_) => ErrorKind::Validation,
        MutationError::Conflict(_) => ErrorKind::Conflict,
        MutationError::RemoteFailure { kind, .. } => *kind,
    };
    AppError::new(kind, err.user_message())
}
