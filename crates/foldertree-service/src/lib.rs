//! # foldertree-service
//!
//! The folder tree manager proper: a disposable [`folder::TreeIndex`]
//! built from remote snapshots, pre-flight [`folder::validator`] checks,
//! the [`folder::SyncCoordinator`] that runs mutations against the remote
//! store, UI-side [`view::TreeViewState`], and
//! per-folder [`video`] filtering.

pub mod error;
pub mod folder;
pub mod video;
pub mod view;

pub use error::{GENERIC_FAILURE_MESSAGE, MutationError, Rejection};
pub use folder::{
    DeletePlan, Mutation, MutationHandle, MutationKind, MutationOutcome, MutationState,
    SyncCoordinator, TreeIndex, spawn_refresher,
};
pub use view::{MoveTarget, TreeRow, TreeViewState, move_targets};
