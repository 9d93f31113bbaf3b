//! Runs folder mutations against the remote store and keeps the local
//! snapshot in step with it.
//!
//! Each mutation moves through `Idle → Validating → Submitting` and ends in
//! `Committed`, `Rejected`, or `Failed`. Validation and the in-flight check
//! happen synchronously inside [`SyncCoordinator::submit`]; the remote work
//! runs in a spawned task so it completes (and the snapshot is rebuilt)
//! even if the caller stops waiting.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use foldertree_core::error::ErrorKind;
use foldertree_core::result::AppResult;
use foldertree_core::types::{DeletePolicy, FolderId};
use foldertree_entity::folder::{CreateFolder, Folder};
use foldertree_entity::video::Video;
use foldertree_remote::store::{FolderStore, VideoStore};

use crate::error::MutationError;
use crate::folder::index::TreeIndex;
use crate::folder::validator::{self, DeletePlan};

/// A structural change requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a folder under `parent_id` (`None` for root).
    Create {
        /// Folder name.
        name: String,
        /// Parent folder.
        parent_id: Option<FolderId>,
    },
    /// Rename a folder.
    Rename {
        /// Folder to rename.
        folder_id: FolderId,
        /// New name.
        name: String,
    },
    /// Reparent a folder (`None` moves it to root).
    Move {
        /// Folder to move.
        folder_id: FolderId,
        /// New parent.
        parent_id: Option<FolderId>,
    },
    /// Delete a folder under the given policy.
    Delete {
        /// Folder to delete.
        folder_id: FolderId,
        /// Descendant disposition.
        policy: DeletePolicy,
    },
}

impl Mutation {
    /// The kind of change.
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Rename { .. } => MutationKind::Rename,
            Self::Move { .. } => MutationKind::Move,
            Self::Delete { .. } => MutationKind::Delete,
        }
    }

    /// The existing folder the change targets, if any.
    pub fn folder_id(&self) -> Option<FolderId> {
        match self {
            Self::Create { .. } => None,
            Self::Rename { folder_id, .. }
            | Self::Move { folder_id, .. }
            | Self::Delete { folder_id, .. } => Some(*folder_id),
        }
    }
}

/// Kind of folder mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Folder creation.
    Create,
    /// Folder rename.
    Rename,
    /// Folder move.
    Move,
    /// Folder delete.
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Rename => write!(f, "rename"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Lifecycle of a single mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    /// Created, nothing checked yet.
    Idle,
    /// Running local validation against the current snapshot.
    Validating,
    /// Remote call in flight.
    Submitting,
    /// Remote call succeeded and the snapshot refresh has been attempted.
    Committed,
    /// Refused before any network call (validation or conflict).
    Rejected(MutationError),
    /// The remote store failed or refused the request.
    Failed(MutationError),
}

impl MutationState {
    /// Whether the mutation has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Rejected(_) | Self::Failed(_)
        )
    }
}

/// What a committed mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Kind of change.
    pub kind: MutationKind,
    /// The created, renamed, or moved folder as returned by the store.
    pub folder: Option<Folder>,
    /// Folders deleted, in deletion order.
    pub deleted: Vec<FolderId>,
    /// Children reparented by a PROMOTE delete.
    pub promoted: Vec<FolderId>,
    /// Videos whose folder was cleared or reassigned.
    pub videos_reassigned: usize,
    /// Whether the follow-up snapshot refresh succeeded.
    pub refreshed: bool,
}

/// Caller-side view of a submitted mutation.
///
/// Dropping the handle does not cancel the remote work.
#[derive(Debug)]
pub struct MutationHandle {
    /// Kind of change.
    kind: MutationKind,
    /// Live state.
    state: watch::Receiver<MutationState>,
    /// Result, immediate or pending.
    result: HandleResult,
}

#[derive(Debug)]
enum HandleResult {
    Ready(Result<MutationOutcome, MutationError>),
    Running(JoinHandle<Result<MutationOutcome, MutationError>>),
}

impl MutationHandle {
    fn ready(
        kind: MutationKind,
        state: watch::Receiver<MutationState>,
        result: Result<MutationOutcome, MutationError>,
    ) -> Self {
        Self {
            kind,
            state,
            result: HandleResult::Ready(result),
        }
    }

    /// Kind of change.
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Current state.
    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every later state transition.
    pub fn watch(&self) -> watch::Receiver<MutationState> {
        self.state.clone()
    }

    /// Wait for the mutation to finish.
    pub async fn outcome(self) -> Result<MutationOutcome, MutationError> {
        match self.result {
            HandleResult::Ready(result) => result,
            HandleResult::Running(task) => task.await.unwrap_or_else(|e| {
                error!(kind = %self.kind, error = %e, "Mutation task aborted");
                Err(MutationError::RemoteFailure {
                    kind: ErrorKind::Internal,
                    message: None,
                })
            }),
        }
    }
}

/// A validated mutation, ready to send.
#[derive(Debug, Clone)]
enum Prepared {
    Create {
        name: String,
        parent_id: Option<FolderId>,
    },
    Rename {
        folder_id: FolderId,
        name: String,
    },
    Move {
        folder_id: FolderId,
        parent_id: Option<FolderId>,
    },
    Delete(DeletePlan),
}

impl Prepared {
    fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Rename { .. } => MutationKind::Rename,
            Self::Move { .. } => MutationKind::Move,
            Self::Delete(_) => MutationKind::Delete,
        }
    }

    /// Folder ids that must not be touched by anything else meanwhile.
    /// Creates and moves also claim the parent they write into.
    fn locked_ids(&self) -> Vec<FolderId> {
        match self {
            Self::Create { parent_id, .. } => parent_id.iter().copied().collect(),
            Self::Rename { folder_id, .. } => vec![*folder_id],
            Self::Move {
                folder_id,
                parent_id,
            } => std::iter::once(*folder_id).chain(*parent_id).collect(),
            Self::Delete(plan) => plan.affected_ids(),
        }
    }
}

/// Remote effects of one applied mutation.
#[derive(Debug, Default)]
struct Applied {
    folder: Option<Folder>,
    deleted: Vec<FolderId>,
    promoted: Vec<FolderId>,
    videos_reassigned: usize,
}

/// Marks folder ids as busy until dropped.
#[derive(Debug)]
struct InFlightGuard {
    registry: Arc<DashMap<FolderId, MutationKind>>,
    ids: Vec<FolderId>,
}

impl InFlightGuard {
    /// Claim every id or none. Returns the first busy id on failure.
    fn acquire(
        registry: &Arc<DashMap<FolderId, MutationKind>>,
        mut ids: Vec<FolderId>,
        kind: MutationKind,
    ) -> Result<Self, FolderId> {
        ids.sort();
        ids.dedup();

        let mut guard = Self {
            registry: Arc::clone(registry),
            ids: Vec::with_capacity(ids.len()),
        };

        for id in ids {
            let claimed = match registry.entry(id) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(kind);
                    true
                }
            };
            if !claimed {
                return Err(id);
            }
            guard.ids.push(id);
        }

        debug!(kind = %kind, count = guard.ids.len(), "Folder ids claimed");
        Ok(guard)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        for id in &self.ids {
            self.registry.remove(id);
        }
        if !self.ids.is_empty() {
            debug!(count = self.ids.len(), "Folder ids released");
        }
    }
}

/// Applies mutations remotely and republishes the snapshot afterwards.
///
/// Cloning is cheap; clones share the snapshot and the in-flight registry.
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    /// Folder side of the remote store.
    folders: Arc<dyn FolderStore>,
    /// Video side of the remote store.
    videos: Arc<dyn VideoStore>,
    /// Latest snapshot, published to subscribers.
    snapshot: Arc<watch::Sender<Arc<TreeIndex>>>,
    /// Folder ids with a mutation in flight.
    in_flight: Arc<DashMap<FolderId, MutationKind>>,
    /// Ticket handed to each listing fetch, in start order.
    refresh_seq: Arc<AtomicU64>,
    /// Ticket of the listing currently published.
    published_seq: Arc<AtomicU64>,
    /// Policy used by [`SyncCoordinator::delete`].
    delete_policy: DeletePolicy,
}

impl SyncCoordinator {
    /// Create a coordinator with an empty snapshot.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        videos: Arc<dyn VideoStore>,
        delete_policy: DeletePolicy,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(TreeIndex::default()));
        Self {
            folders,
            videos,
            snapshot: Arc::new(snapshot),
            in_flight: Arc::new(DashMap::new()),
            refresh_seq: Arc::new(AtomicU64::new(0)),
            published_seq: Arc::new(AtomicU64::new(0)),
            delete_policy,
        }
    }

    /// Create a coordinator over a store that serves folders and videos.
    pub fn with_store<S>(store: Arc<S>, delete_policy: DeletePolicy) -> Self
    where
        S: FolderStore + VideoStore,
    {
        Self::new(store.clone(), store, delete_policy)
    }

    /// The configured delete policy.
    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<TreeIndex> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Receive every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TreeIndex>> {
        self.snapshot.subscribe()
    }

    /// Whether a mutation touching `id` is in flight.
    pub fn is_in_flight(&self, id: FolderId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Fetch a full listing and publish a freshly built index.
    ///
    /// A listing is only published if no fetch started after it has been
    /// published already; otherwise it is dropped and the newer snapshot
    /// is returned.
    pub async fn refresh(&self) -> AppResult<Arc<TreeIndex>> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let folders = self.folders.list_folders().await?;
        let index = Arc::new(TreeIndex::build(folders));

        let published = self.snapshot.send_if_modified(|current| {
            if self.published_seq.load(Ordering::SeqCst) >= seq {
                return false;
            }
            self.published_seq.store(seq, Ordering::SeqCst);
            *current = Arc::clone(&index);
            true
        });

        if !published {
            debug!(seq, "Discarded folder listing older than the published snapshot");
            return Ok(self.snapshot());
        }

        info!(folders = index.len(), seq, "Folder snapshot rebuilt");
        Ok(index)
    }

    /// Every video, straight from the store.
    pub async fn videos(&self) -> AppResult<Vec<Video>> {
        self.videos.list_videos().await
    }

    /// Validate and start a mutation.
    ///
    /// Must be called from within a Tokio runtime. Rejections and conflicts
    /// are decided before this returns and never reach the network.
    pub fn submit(&self, mutation: Mutation) -> MutationHandle {
        let kind = mutation.kind();
        let folder_id = mutation.folder_id();
        let (state_tx, state_rx) = watch::channel(MutationState::Idle);

        state_tx.send_replace(MutationState::Validating);
        let index = self.snapshot();
        let prepared = match prepare(mutation, &index) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(kind = %kind, folder_id = ?folder_id, reason = %err, "Folder mutation rejected");
                state_tx.send_replace(MutationState::Rejected(err.clone()));
                return MutationHandle::ready(kind, state_rx, Err(err));
            }
        };

        let guard = match InFlightGuard::acquire(&self.in_flight, prepared.locked_ids(), kind) {
            Ok(guard) => guard,
            Err(busy) => {
                warn!(kind = %kind, folder_id = %busy, "Folder mutation conflicts with one in flight");
                let err = MutationError::Conflict(busy);
                state_tx.send_replace(MutationState::Rejected(err.clone()));
                return MutationHandle::ready(kind, state_rx, Err(err));
            }
        };

        state_tx.send_replace(MutationState::Submitting);
        let coordinator = self.clone();
        let task = tokio::spawn(async move {
            let result = coordinator.execute(prepared).await;
            drop(guard);
            match &result {
                Ok(_) => state_tx.send_replace(MutationState::Committed),
                Err(err) => state_tx.send_replace(MutationState::Failed(err.clone())),
            };
            result
        });

        MutationHandle {
            kind,
            state: state_rx,
            result: HandleResult::Running(task),
        }
    }

    /// Create a folder.
    pub async fn create(
        &self,
        name: impl Into<String>,
        parent_id: Option<FolderId>,
    ) -> Result<MutationOutcome, MutationError> {
        self.submit(Mutation::Create {
            name: name.into(),
            parent_id,
        })
        .outcome()
        .await
    }

    /// Rename a folder.
    pub async fn rename(
        &self,
        folder_id: FolderId,
        name: impl Into<String>,
    ) -> Result<MutationOutcome, MutationError> {
        self.submit(Mutation::Rename {
            folder_id,
            name: name.into(),
        })
        .outcome()
        .await
    }

    /// Move a folder (`None` for root).
    pub async fn move_folder(
        &self,
        folder_id: FolderId,
        parent_id: Option<FolderId>,
    ) -> Result<MutationOutcome, MutationError> {
        self.submit(Mutation::Move {
            folder_id,
            parent_id,
        })
        .outcome()
        .await
    }

    /// Delete a folder under the configured policy.
    pub async fn delete(&self, folder_id: FolderId) -> Result<MutationOutcome, MutationError> {
        self.delete_with(folder_id, self.delete_policy).await
    }

    /// Delete a folder under an explicit policy.
    pub async fn delete_with(
        &self,
        folder_id: FolderId,
        policy: DeletePolicy,
    ) -> Result<MutationOutcome, MutationError> {
        self.submit(Mutation::Delete { folder_id, policy })
            .outcome()
            .await
    }

    /// Apply remotely, then rebuild the snapshot whatever the result.
    async fn execute(&self, prepared: Prepared) -> Result<MutationOutcome, MutationError> {
        let kind = prepared.kind();
        let applied = self.apply(&prepared).await;

        let refreshed = match self.refresh().await {
            Ok(_) => true,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Snapshot refresh after mutation failed");
                false
            }
        };

        match applied {
            Ok(applied) => {
                info!(
                    kind = %kind,
                    folder_id = ?applied.folder.as_ref().map(|f| f.id),
                    deleted = applied.deleted.len(),
                    promoted = applied.promoted.len(),
                    videos_reassigned = applied.videos_reassigned,
                    "Folder mutation committed"
                );
                Ok(MutationOutcome {
                    kind,
                    folder: applied.folder,
                    deleted: applied.deleted,
                    promoted: applied.promoted,
                    videos_reassigned: applied.videos_reassigned,
                    refreshed,
                })
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, detail = ?e.detail, "Folder mutation failed");
                Err(e.into())
            }
        }
    }

    async fn apply(&self, prepared: &Prepared) -> AppResult<Applied> {
        match prepared {
            Prepared::Create { name, parent_id } => {
                let req = CreateFolder {
                    name: name.clone(),
                    parent_id: *parent_id,
                };
                let folder = self.folders.create_folder(&req).await?;
                Ok(Applied {
                    folder: Some(folder),
                    ..Applied::default()
                })
            }
            Prepared::Rename { folder_id, name } => {
                let folder = self.folders.rename_folder(*folder_id, name).await?;
                Ok(Applied {
                    folder: Some(folder),
                    ..Applied::default()
                })
            }
            Prepared::Move {
                folder_id,
                parent_id,
            } => {
                let folder = self.folders.move_folder(*folder_id, *parent_id).await?;
                Ok(Applied {
                    folder: Some(folder),
                    ..Applied::default()
                })
            }
            Prepared::Delete(plan) => self.apply_delete(plan).await,
        }
    }

    /// Empty the doomed folders, then delete them children-first.
    async fn apply_delete(&self, plan: &DeletePlan) -> AppResult<Applied> {
        let removed: HashSet<FolderId> = plan.removed.iter().copied().collect();

        let videos = self.videos.list_videos().await?;
        let mut videos_reassigned = 0;
        for video in videos
            .iter()
            .filter(|v| v.folder_id.is_some_and(|f| removed.contains(&f)))
        {
            self.videos
                .assign_folder(video.id, plan.video_destination)
                .await?;
            videos_reassigned += 1;
        }

        for &child in &plan.promoted {
            self.folders.move_folder(child, plan.new_parent).await?;
        }

        for &id in &plan.removed {
            self.folders.delete_folder(id).await?;
        }

        Ok(Applied {
            folder: None,
            deleted: plan.removed.clone(),
            promoted: plan.promoted.clone(),
            videos_reassigned,
        })
    }
}

/// Run local validation and normalize names.
fn prepare(mutation: Mutation, index: &TreeIndex) -> Result<Prepared, MutationError> {
    let prepared = match mutation {
        Mutation::Create { name, parent_id } => {
            validator::validate_create(&name, parent_id, index)?;
            Prepared::Create {
                name: name.trim().to_string(),
                parent_id,
            }
        }
        Mutation::Rename { folder_id, name } => {
            validator::validate_rename(folder_id, &name, index)?;
            Prepared::Rename {
                folder_id,
                name: name.trim().to_string(),
            }
        }
        Mutation::Move {
            folder_id,
            parent_id,
        } => {
            validator::validate_move(folder_id, parent_id, index)?;
            Prepared::Move {
                folder_id,
                parent_id,
            }
        }
        Mutation::Delete { folder_id, policy } => {
            Prepared::Delete(validator::validate_delete(folder_id, index, policy)?)
        }
    };
    Ok(prepared)
}
