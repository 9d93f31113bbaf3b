//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use foldertree_core::result::AppResult;
use foldertree_core::types::{DeletePolicy, FolderId, VideoId};
use foldertree_entity::folder::{CreateFolder, Folder};
use foldertree_entity::video::Video;
use foldertree_remote::{FolderStore, InMemoryStore, VideoStore};
use foldertree_service::SyncCoordinator;

/// A new folder record.
pub fn folder(name: &str, parent: Option<&Folder>) -> Folder {
    Folder::new(FolderId::new(), name, parent.map(|p| p.id))
}

/// A new video filed in `folder`.
pub fn video_in(folder: Option<&Folder>) -> Video {
    Video {
        id: VideoId::new(),
        folder_id: folder.map(|f| f.id),
        title: Some("clip".to_string()),
        status: None,
    }
}

/// Coordinator over an in-memory store
pub struct TestApp {
    /// Remote store double
    pub store: Arc<InMemoryStore>,
    /// Coordinator under test, with its first snapshot loaded
    pub coordinator: SyncCoordinator,
}

impl TestApp {
    /// Create a new test application
    pub async fn new(folders: Vec<Folder>, videos: Vec<Video>) -> Self {
        let store = Arc::new(InMemoryStore::with_data(folders, videos));
        let coordinator = SyncCoordinator::with_store(Arc::clone(&store), DeletePolicy::Promote);
        coordinator.refresh().await.expect("Failed to load snapshot");
        Self { store, coordinator }
    }

    /// Parent of `id` as currently stored remotely
    pub fn remote_parent(&self, id: FolderId) -> Option<FolderId> {
        self.store
            .folders()
            .into_iter()
            .find(|f| f.id == id)
            .and_then(|f| f.parent_id)
    }

    /// Whether `id` is still stored remotely
    pub fn remote_has(&self, id: FolderId) -> bool {
        self.store.folders().iter().any(|f| f.id == id)
    }
}

/// Store whose folder mutations block until released.
///
/// Listing is never gated, so snapshot refreshes pass straight through.
#[derive(Debug)]
pub struct GatedStore {
    /// Backing store
    pub inner: InMemoryStore,
    /// One permit per mutation allowed through
    gate: Semaphore,
    /// Signalled each time a mutation reaches the gate
    arrived: Notify,
}

impl GatedStore {
    /// Create a closed gate in front of the given data.
    pub fn new(folders: Vec<Folder>, videos: Vec<Video>) -> Self {
        Self {
            inner: InMemoryStore::with_data(folders, videos),
            gate: Semaphore::new(0),
            arrived: Notify::new(),
        }
    }

    /// Let `n` more folder mutations through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until a folder mutation is waiting at (or has passed) the gate.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    async fn pass(&self) {
        self.arrived.notify_one();
        self.gate.acquire().await.expect("gate never closes").forget();
    }
}

#[async_trait]
impl FolderStore for GatedStore {
    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        self.inner.list_folders().await
    }

    async fn create_folder(&self, req: &CreateFolder) -> AppResult<Folder> {
        self.pass().await;
        self.inner.create_folder(req).await
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        self.pass().await;
        self.inner.rename_folder(id, name).await
    }

    async fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        self.pass().await;
        self.inner.move_folder(id, parent_id).await
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.pass().await;
        self.inner.delete_folder(id).await
    }
}

#[async_trait]
impl VideoStore for GatedStore {
    async fn list_videos(&self) -> AppResult<Vec<Video>> {
        self.inner.list_videos().await
    }

    async fn assign_folder(&self, id: VideoId, folder_id: Option<FolderId>) -> AppResult<Video> {
        self.inner.assign_folder(id, folder_id).await
    }
}

/// Store that parks one chosen folder listing after reading its data.
///
/// Mutations pass straight through.
#[derive(Debug)]
pub struct HeldListingStore {
    /// Backing store
    pub inner: InMemoryStore,
    /// 1-based number of the listing call to hold
    held_call: usize,
    /// Listing calls seen so far
    calls: AtomicUsize,
    /// Opened by `release_listing`
    gate: Semaphore,
    /// Signalled when the held listing has read its data
    held: Notify,
}

impl HeldListingStore {
    /// Hold the `held_call`-th listing.
    pub fn new(folders: Vec<Folder>, held_call: usize) -> Self {
        Self {
            inner: InMemoryStore::with_data(folders, Vec::new()),
            held_call,
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            held: Notify::new(),
        }
    }

    /// Wait until the held listing has read the data it will return.
    pub async fn listing_held(&self) {
        self.held.notified().await;
    }

    /// Let the held listing return.
    pub fn release_listing(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl FolderStore for HeldListingStore {
    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        let folders = self.inner.list_folders().await?;
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.held_call {
            self.held.notify_one();
            self.gate.acquire().await.expect("gate never closes").forget();
        }
        Ok(folders)
    }

    async fn create_folder(&self, req: &CreateFolder) -> AppResult<Folder> {
        self.inner.create_folder(req).await
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        self.inner.rename_folder(id, name).await
    }

    async fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        self.inner.move_folder(id, parent_id).await
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.inner.delete_folder(id).await
    }
}

#[async_trait]
impl VideoStore for HeldListingStore {
    async fn list_videos(&self) -> AppResult<Vec<Video>> {
        self.inner.list_videos().await
    }

    async fn assign_folder(&self, id: VideoId, folder_id: Option<FolderId>) -> AppResult<Video> {
        self.inner.assign_folder(id, folder_id).await
    }
}

/// Coordinator over a gated store
pub async fn gated_app(folders: Vec<Folder>) -> (Arc<GatedStore>, SyncCoordinator) {
    let store = Arc::new(GatedStore::new(folders, Vec::new()));
    let coordinator = SyncCoordinator::with_store(Arc::clone(&store), DeletePolicy::Cascade);
    coordinator.refresh().await.expect("Failed to load snapshot");
    (store, coordinator)
}
