//! Video entity model.

use serde::{Deserialize, Serialize};

use foldertree_core::types::{FolderId, VideoId};

/// Processing state reported by the video backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    /// Waiting to be processed.
    Pending,
    /// Being processed.
    Processing,
    /// Ready to play.
    Completed,
    /// Processing failed.
    Failed,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A video as seen by the folder tree: identity, title, and folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video identifier.
    pub id: VideoId,
    /// Containing folder, `None` when the video is not filed.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Processing status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
}

/// Body for reassigning a video's folder. `None` is serialized as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignVideoFolder {
    /// Destination folder.
    pub folder_id: Option<FolderId>,
}
