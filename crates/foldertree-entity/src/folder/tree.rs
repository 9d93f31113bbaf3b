//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use foldertree_core::types::FolderId;

/// A node in a folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Depth level (0 for roots).
    pub depth: usize,
    /// Number of child folders.
    pub child_count: u64,
    /// Number of videos directly in this folder.
    pub video_count: u64,
    /// Child folder nodes.
    pub children: Vec<FolderNode>,
}

/// A complete folder forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root node(s) of the tree.
    pub roots: Vec<FolderNode>,
    /// Total number of folders reachable from the roots.
    pub total_folders: u64,
}

impl FolderTree {
    /// Whether the tree has no folders.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
