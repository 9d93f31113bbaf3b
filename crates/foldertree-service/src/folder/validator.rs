//! Pre-flight checks for folder mutations.
//!
//! Every check runs against a snapshot before anything is sent. Expected
//! failures come back as a [`Rejection`]; nothing here panics or touches
//! the network.

use foldertree_core::types::{DeletePolicy, FolderId};
use foldertree_entity::folder::is_valid_name;

use crate::error::Rejection;
use crate::folder::index::TreeIndex;

/// The remote steps that carry out a folder delete.
///
/// Steps run in field order: videos are reassigned, promoted children are
/// moved, then folders are deleted deepest first. After every step the
/// remote tree is still a forest and no video points at a missing folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    /// The folder the user asked to delete.
    pub target: FolderId,
    /// Policy the plan was built for.
    pub policy: DeletePolicy,
    /// Folder the target's videos (and, for CASCADE, the whole subtree's
    /// videos) end up in. `None` clears their folder.
    pub video_destination: Option<FolderId>,
    /// Direct children reparented to `new_parent` (PROMOTE only).
    pub promoted: Vec<FolderId>,
    /// Where promoted children go: the target's former parent.
    pub new_parent: Option<FolderId>,
    /// Folders to delete, children before parents. The target is last.
    pub removed: Vec<FolderId>,
}

impl DeletePlan {
    /// Every folder id the plan touches.
    pub fn affected_ids(&self) -> Vec<FolderId> {
        let mut ids = self.removed.clone();
        ids.extend(self.promoted.iter().copied());
        ids
    }
}

/// Check a create request.
pub fn validate_create(
    name: &str,
    parent_id: Option<FolderId>,
    index: &TreeIndex,
) -> Result<(), Rejection> {
    if !is_valid_name(name) {
        return Err(Rejection::InvalidName);
    }
    if let Some(parent_id) = parent_id {
        if !index.contains(parent_id) {
            return Err(Rejection::UnknownParent(parent_id));
        }
    }
    Ok(())
}

/// Check a rename request.
pub fn validate_rename(
    folder_id: FolderId,
    new_name: &str,
    index: &TreeIndex,
) -> Result<(), Rejection> {
    if !index.contains(folder_id) {
        return Err(Rejection::UnknownFolder(folder_id));
    }
    if !is_valid_name(new_name) {
        return Err(Rejection::InvalidName);
    }
    Ok(())
}

/// Check a move request.
///
/// The folder itself and everything below it are never valid targets;
/// accepting one would detach the subtree into an unreachable cycle.
pub fn validate_move(
    folder_id: FolderId,
    new_parent_id: Option<FolderId>,
    index: &TreeIndex,
) -> Result<(), Rejection> {
    if !index.contains(folder_id) {
        return Err(Rejection::UnknownFolder(folder_id));
    }
    let Some(target) = new_parent_id else {
        return Ok(());
    };
    if !index.contains(target) {
        return Err(Rejection::UnknownParent(target));
    }
    if index.descendants_of(folder_id).contains(&target) {
        return Err(Rejection::CyclicMove {
            folder: folder_id,
            target,
        });
    }
    Ok(())
}

/// Check a delete request and work out what it will do.
pub fn validate_delete(
    folder_id: FolderId,
    index: &TreeIndex,
    policy: DeletePolicy,
) -> Result<DeletePlan, Rejection> {
    let folder = index
        .get(folder_id)
        .ok_or(Rejection::UnknownFolder(folder_id))?;
    let former_parent = folder.parent_id;

    let plan = match policy {
        DeletePolicy::Cascade => {
            let mut removed = index.subtree_breadth_first(folder_id);
            removed.reverse();
            DeletePlan {
                target: folder_id,
                policy,
                video_destination: None,
                promoted: Vec::new(),
                new_parent: former_parent,
                removed,
            }
        }
        DeletePolicy::Promote => DeletePlan {
            target: folder_id,
            policy,
            video_destination: former_parent,
            promoted: index
                .children_of(Some(folder_id))
                .iter()
                .map(|f| f.id)
                .filter(|&id| id != folder_id)
                .collect(),
            new_parent: former_parent,
            removed: vec![folder_id],
        },
    };
    Ok(plan)
}
