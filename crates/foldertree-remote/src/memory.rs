//! In-memory remote store.
//!
//! Holds folders and videos in insertion order and re-checks the same rules
//! the REST backend does: parents must exist, a folder cannot move under
//! itself or its descendants, and only empty folders can be deleted.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use foldertree_core::error::AppError;
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, VideoId};
use foldertree_entity::folder::{CreateFolder, Folder};
use foldertree_entity::video::Video;

use crate::store::{FolderStore, VideoStore};

/// Folder and video store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Folders in insertion order.
    folders: Mutex<Vec<Folder>>,
    /// Videos in insertion order.
    videos: Mutex<Vec<Video>>,
    /// Errors returned by the next mutating calls, oldest first.
    injected: Mutex<VecDeque<AppError>>,
    /// Number of mutating calls received (including failed ones).
    mutations: AtomicUsize,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with folders and videos.
    pub fn with_data(folders: Vec<Folder>, videos: Vec<Video>) -> Self {
        Self {
            folders: Mutex::new(folders),
            videos: Mutex::new(videos),
            ..Self::default()
        }
    }

    /// Make the next mutating call fail with `err`.
    pub fn fail_next(&self, err: AppError) {
        self.injected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    /// How many create/rename/move/delete/assign calls reached the store.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Current folders, in insertion order.
    pub fn folders(&self) -> Vec<Folder> {
        self.folders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current videos, in insertion order.
    pub fn videos(&self) -> Vec<Video> {
        self.videos.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Count the call and pop an injected failure, if any.
    fn begin_mutation(&self) -> AppResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        match self
            .injected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Ids strictly below `root` in `folders`. Cycle-safe.
fn descendant_ids(folders: &[Folder], root: FolderId) -> HashSet<FolderId> {
    let mut found = HashSet::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        for f in folders.iter().filter(|f| f.parent_id == Some(current)) {
            if f.id != root && found.insert(f.id) {
                stack.push(f.id);
            }
        }
    }
    found
}

fn folder_not_found() -> AppError {
    AppError::not_found("Folder not found").with_detail("Folder not found")
}

#[async_trait]
impl FolderStore for InMemoryStore {
    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        Ok(self.folders())
    }

    async fn create_folder(&self, req: &CreateFolder) -> AppResult<Folder> {
        self.begin_mutation()?;
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent_id) = req.parent_id {
            if !folders.iter().any(|f| f.id == parent_id) {
                return Err(AppError::not_found("Parent folder not found")
                    .with_detail("Parent folder not found"));
            }
        }

        let mut folder = Folder::new(FolderId::new(), req.name.clone(), req.parent_id);
        folder.created_at = Some(Utc::now());
        folders.push(folder.clone());

        debug!(folder_id = %folder.id, "In-memory folder created");
        Ok(folder)
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        self.begin_mutation()?;
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());

        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(folder_not_found)?;
        folder.name = name.to_string();
        Ok(folder.clone())
    }

    async fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        self.begin_mutation()?;
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());

        if !folders.iter().any(|f| f.id == id) {
            return Err(folder_not_found());
        }

        if let Some(target) = parent_id {
            if target == id {
                return Err(AppError::validation("Invalid move")
                    .with_detail("Folder cannot be moved into itself"));
            }
            if descendant_ids(&folders, id).contains(&target) {
                return Err(AppError::validation("Invalid move")
                    .with_detail("Folder cannot be moved into one of its subfolders"));
            }
            if !folders.iter().any(|f| f.id == target) {
                return Err(AppError::not_found("Target folder not found")
                    .with_detail("Target folder not found"));
            }
        }

        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(folder_not_found)?;
        folder.parent_id = parent_id;
        Ok(folder.clone())
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.begin_mutation()?;
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());

        if !folders.iter().any(|f| f.id == id) {
            return Err(folder_not_found());
        }
        if folders.iter().any(|f| f.parent_id == Some(id)) {
            return Err(AppError::validation("Folder not empty")
                .with_detail("Folder has subfolders; delete or move them first"));
        }

        let videos = self.videos.lock().unwrap_or_else(|e| e.into_inner());
        if videos.iter().any(|v| v.folder_id == Some(id)) {
            return Err(AppError::validation("Folder not empty")
                .with_detail("Folder contains videos; move them first"));
        }

        folders.retain(|f| f.id != id);
        debug!(folder_id = %id, "In-memory folder deleted");
        Ok(())
    }
}

#[async_trait]
impl VideoStore for InMemoryStore {
    async fn list_videos(&self) -> AppResult<Vec<Video>> {
        Ok(self.videos())
    }

    async fn assign_folder(&self, id: VideoId, folder_id: Option<FolderId>) -> AppResult<Video> {
        self.begin_mutation()?;

        if let Some(target) = folder_id {
            let folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());
            if !folders.iter().any(|f| f.id == target) {
                return Err(AppError::not_found("Target folder not found")
                    .with_detail("Target folder not found"));
            }
        }

        let mut videos = self.videos.lock().unwrap_or_else(|e| e.into_inner());
        let video = videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::not_found("Video not found").with_detail("Video not found"))?;
        video.folder_id = folder_id;
        Ok(video.clone())
    }
}
