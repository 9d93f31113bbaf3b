//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_core::types::{DeletePolicy, FolderId};
use foldertree_service::folder::validator;
use foldertree_service::video::video_counts;
use foldertree_service::view::{TreeViewState, move_targets};
use foldertree_service::{MutationOutcome, SyncCoordinator};

use super::{mutation_failed, parse_folder_id};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List every folder, indented by depth
    List,
    /// Show the folder tree with video counts
    Tree {
        /// Max depth (0 shows roots only)
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: String,
        /// New name
        name: String,
    },
    /// Move a folder under another folder or to the root
    Move {
        /// Folder ID
        id: String,
        /// New parent folder ID (prompts if neither this nor --root is given)
        #[arg(short, long, conflicts_with = "root")]
        parent: Option<String>,
        /// Move to the root
        #[arg(long)]
        root: bool,
    },
    /// Delete a folder
    Delete {
        /// Folder ID
        id: String,
        /// What happens to subfolders (defaults to the configured policy)
        #[arg(long)]
        policy: Option<DeletePolicy>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name, indented by depth
    name: String,
    /// Parent folder ID
    parent_id: String,
    /// Videos directly in the folder
    videos: u64,
    /// Created at
    created_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinator = super::connect(config).await?;

    match &args.command {
        FolderCommand::List => {
            let index = coordinator.snapshot();
            let counts = video_counts(&coordinator.videos().await?);

            let mut view = TreeViewState::new();
            for folder in index.folders() {
                view.expand(folder.id);
            }

            let rows: Vec<FolderRow> = view
                .visible_rows(&index)
                .iter()
                .map(|row| FolderRow {
                    id: row.folder.id.to_string(),
                    name: format!("{}{}", "  ".repeat(row.depth), row.folder.name),
                    parent_id: row
                        .folder
                        .parent_id
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    videos: counts.get(&row.folder.id).copied().unwrap_or(0),
                    created_at: row
                        .folder
                        .created_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                })
                .collect();

            output::print_list(&rows, format);
            if !index.unreachable().is_empty() {
                output::print_warning(&format!(
                    "{} folder(s) are not reachable from any root",
                    index.unreachable().len()
                ));
            }
        }
        FolderCommand::Tree { depth } => {
            let index = coordinator.snapshot();
            let counts = video_counts(&coordinator.videos().await?);
            output::print_tree(&index.to_tree(&counts), *depth, format);
        }
        FolderCommand::Create { name, parent } => {
            let parent_id = parent.as_deref().map(parse_folder_id).transpose()?;
            let outcome = coordinator
                .create(name.as_str(), parent_id)
                .await
                .map_err(mutation_failed)?;
            report(&outcome, format, "created");
        }
        FolderCommand::Rename { id, name } => {
            let folder_id = parse_folder_id(id)?;
            let outcome = coordinator
                .rename(folder_id, name.as_str())
                .await
                .map_err(mutation_failed)?;
            report(&outcome, format, "renamed");
        }
        FolderCommand::Move { id, parent, root } => {
            let folder_id = parse_folder_id(id)?;
            let parent_id = match (parent.as_deref(), *root) {
                (Some(p), _) => Some(parse_folder_id(p)?),
                (None, true) => None,
                (None, false) => match pick_move_target(&coordinator, folder_id)? {
                    Some(target) => target,
                    None => {
                        println!("Cancelled.");
                        return Ok(());
                    }
                },
            };
            let outcome = coordinator
                .move_folder(folder_id, parent_id)
                .await
                .map_err(mutation_failed)?;
            report(&outcome, format, "moved");
        }
        FolderCommand::Delete { id, policy, yes } => {
            let folder_id = parse_folder_id(id)?;
            let policy = policy.unwrap_or(coordinator.delete_policy());

            if !yes {
                let index = coordinator.snapshot();
                let plan = validator::validate_delete(folder_id, &index, policy)
                    .map_err(|r| mutation_failed(r.into()))?;
                let name = index
                    .get(folder_id)
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                let prompt = match policy {
                    DeletePolicy::Cascade => format!(
                        "Delete '{}' and {} subfolder(s)? Videos inside will be kept but unfiled.",
                        name,
                        plan.removed.len().saturating_sub(1)
                    ),
                    DeletePolicy::Promote => format!(
                        "Delete '{}'? {} subfolder(s) and its videos move up one level.",
                        name,
                        plan.promoted.len()
                    ),
                };

                let confirm = dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let outcome = coordinator
                .delete_with(folder_id, policy)
                .await
                .map_err(mutation_failed)?;
            report(&outcome, format, "deleted");
        }
    }

    Ok(())
}

/// Ask which folder to move under. `Ok(None)` when the user backs out.
fn pick_move_target(
    coordinator: &SyncCoordinator,
    folder_id: FolderId,
) -> Result<Option<Option<FolderId>>, AppError> {
    let index = coordinator.snapshot();
    let targets: Vec<_> = move_targets(folder_id, &index)
        .into_iter()
        .filter(|t| !t.disabled)
        .collect();
    let labels: Vec<String> = targets
        .iter()
        .map(|t| format!("{}{}", "  ".repeat(t.depth), t.label))
        .collect();

    let choice = dialoguer::Select::new()
        .with_prompt("Move to")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

    Ok(choice.map(|i| targets[i].parent_id))
}

fn report(outcome: &MutationOutcome, format: OutputFormat, verb: &str) {
    if format == OutputFormat::Json {
        output::print_json(outcome);
        return;
    }

    match &outcome.folder {
        Some(folder) => {
            output::print_success(&format!("Folder '{}' {} (id: {})", folder.name, verb, folder.id))
        }
        None => output::print_success(&format!(
            "{} folder(s) {}, {} promoted, {} video(s) reassigned",
            outcome.deleted.len(),
            verb,
            outcome.promoted.len(),
            outcome.videos_reassigned
        )),
    }

    if !outcome.refreshed {
        output::print_warning("Change saved, but the folder list could not be reloaded.");
    }
}
