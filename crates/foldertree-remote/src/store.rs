//! Remote store traits.

use async_trait::async_trait;

use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, VideoId};
use foldertree_entity::folder::{CreateFolder, Folder};
use foldertree_entity::video::Video;

/// Folder CRUD against the single source of truth.
///
/// Implementations re-check their own invariants; a refusal surfaces as an
/// [`foldertree_core::AppError`] whose `detail` carries the store's message.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Full snapshot of every folder visible to the caller.
    async fn list_folders(&self) -> AppResult<Vec<Folder>>;

    /// Create a folder and return it with its assigned id.
    async fn create_folder(&self, req: &CreateFolder) -> AppResult<Folder>;

    /// Change a folder's name.
    async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Folder>;

    /// Change a folder's parent (`None` moves it to root).
    async fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder>;

    /// Delete a single folder. The store may refuse non-empty folders.
    async fn delete_folder(&self, id: FolderId) -> AppResult<()>;
}

/// Read access to videos plus folder reassignment.
#[async_trait]
pub trait VideoStore: Send + Sync + std::fmt::Debug + 'static {
    /// Every video visible to the caller.
    async fn list_videos(&self) -> AppResult<Vec<Video>>;

    /// Point a video at another folder (`None` clears it).
    async fn assign_folder(&self, id: VideoId, folder_id: Option<FolderId>) -> AppResult<Video>;
}
