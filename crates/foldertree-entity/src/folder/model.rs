//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use foldertree_core::types::{FolderId, UserId};

/// Longest folder name the remote store accepts.
pub const MAX_NAME_LENGTH: usize = 255;

/// A folder in the hierarchy.
///
/// Children are not stored; they are derived from `parent_id` by the tree
/// index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier, assigned by the remote store.
    pub id: FolderId,
    /// Parent folder ID (null for root folders).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// The folder owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// When the folder was created.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Folder {
    /// Build a bare folder record.
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            user_id: None,
            created_at: None,
        }
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// True iff the trimmed name is non-empty and fits the store's column width.
pub fn is_valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= MAX_NAME_LENGTH
}

/// Data required to create a new folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root). Always serialized, `null` included.
    pub parent_id: Option<FolderId>,
}

/// A structural change to an existing folder.
///
/// Serializes to the partial-update body the store expects: `{"name": ..}`
/// for a rename and `{"parent_id": ..}` for a move. A move to root keeps
/// the explicit `null` so the store can tell it apart from "unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FolderUpdate {
    /// Change the name only.
    Rename {
        /// New folder name.
        name: String,
    },
    /// Change the parent only.
    Move {
        /// New parent, `None` for root.
        parent_id: Option<FolderId>,
    },
}

/// Accept RFC 3339 timestamps; treat empty or unparsable values as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
