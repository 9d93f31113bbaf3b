//! Folder tree indexing, validation, and synchronization.

pub mod coordinator;
pub mod index;
pub mod refresh;
pub mod validator;

pub use coordinator::{
    Mutation, MutationHandle, MutationKind, MutationOutcome, MutationState, SyncCoordinator,
};
pub use index::TreeIndex;
pub use refresh::{SnapshotRefresher, spawn_refresher};
pub use validator::DeletePlan;
