//! Video listing CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_service::video::videos_in;

use super::parse_folder_id;

/// Arguments for video commands
#[derive(Debug, Args)]
pub struct VideoArgs {
    /// Video subcommand
    #[command(subcommand)]
    pub command: VideoCommand,
}

/// Video subcommands
#[derive(Debug, Subcommand)]
pub enum VideoCommand {
    /// List videos, optionally only those in one folder
    List {
        /// Folder ID
        #[arg(long)]
        folder: Option<String>,
    },
}

/// Video display row
#[derive(Debug, Serialize, Tabled)]
struct VideoRow {
    /// Video ID
    id: String,
    /// Title
    title: String,
    /// Folder
    folder: String,
    /// Processing status
    status: String,
}

/// Execute video commands
pub async fn execute(
    args: &VideoArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinator = super::connect(config).await?;

    match &args.command {
        VideoCommand::List { folder } => {
            let selection = folder.as_deref().map(parse_folder_id).transpose()?;
            let index = coordinator.snapshot();
            if let Some(id) = selection {
                if !index.contains(id) {
                    return Err(AppError::not_found(format!("Folder {} not found", id)));
                }
            }

            let videos = coordinator.videos().await?;
            let rows: Vec<VideoRow> = videos_in(&videos, selection)
                .into_iter()
                .map(|v| VideoRow {
                    id: v.id.to_string(),
                    title: v.title.clone().unwrap_or_else(|| "(untitled)".to_string()),
                    folder: v
                        .folder_id
                        .and_then(|f| index.get(f))
                        .map(|f| f.name.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    status: v
                        .status
                        .map(|s| format!("{:?}", s))
                        .unwrap_or_default(),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    Ok(())
}
