//! Overlapping mutations and abandoned callers.

use std::sync::Arc;

use foldertree_core::types::DeletePolicy;
use foldertree_service::{Mutation, MutationError, MutationState, SyncCoordinator};

use crate::helpers::{HeldListingStore, folder, gated_app};

#[tokio::test]
async fn test_second_move_on_same_folder_conflicts() {
    let a = folder("A", None);
    let b = folder("B", None);
    let c = folder("C", None);
    let (store, coordinator) = gated_app(vec![a.clone(), b.clone(), c.clone()]).await;

    let first = coordinator.submit(Mutation::Move {
        folder_id: c.id,
        parent_id: Some(a.id),
    });
    assert_eq!(first.state(), MutationState::Submitting);
    assert!(coordinator.is_in_flight(c.id));

    let second = coordinator.submit(Mutation::Move {
        folder_id: c.id,
        parent_id: Some(b.id),
    });
    assert_eq!(
        second.state(),
        MutationState::Rejected(MutationError::Conflict(c.id))
    );
    assert_eq!(
        second.outcome().await.unwrap_err(),
        MutationError::Conflict(c.id)
    );

    store.arrived().await;
    store.release(1);
    first.outcome().await.expect("first move commits");

    assert!(!coordinator.is_in_flight(c.id));
    assert_eq!(
        coordinator.snapshot().get(c.id).and_then(|f| f.parent_id),
        Some(a.id)
    );
    assert_eq!(store.inner.mutation_count(), 1);
}

#[tokio::test]
async fn test_different_folders_proceed_together() {
    let a = folder("A", None);
    let b = folder("B", None);
    let (store, coordinator) = gated_app(vec![a.clone(), b.clone()]).await;

    let rename_a = coordinator.submit(Mutation::Rename {
        folder_id: a.id,
        name: "A2".into(),
    });
    let rename_b = coordinator.submit(Mutation::Rename {
        folder_id: b.id,
        name: "B2".into(),
    });
    let create = coordinator.submit(Mutation::Create {
        name: "New".into(),
        parent_id: None,
    });
    assert_eq!(rename_b.state(), MutationState::Submitting);
    assert_eq!(create.state(), MutationState::Submitting);

    store.release(3);
    rename_a.outcome().await.expect("rename a");
    rename_b.outcome().await.expect("rename b");
    create.outcome().await.expect("create");

    let index = coordinator.snapshot();
    assert_eq!(index.len(), 3);
    assert_eq!(index.get(a.id).expect("a").name, "A2");
    assert_eq!(index.get(b.id).expect("b").name, "B2");
}

#[tokio::test]
async fn test_delete_claims_whole_subtree() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let c = folder("C", Some(&b));
    let d = folder("D", None);
    let (store, coordinator) =
        gated_app(vec![a.clone(), b.clone(), c.clone(), d.clone()]).await;

    let delete = coordinator.submit(Mutation::Delete {
        folder_id: a.id,
        policy: DeletePolicy::Cascade,
    });
    assert!(coordinator.is_in_flight(c.id));

    let rename = coordinator.submit(Mutation::Rename {
        folder_id: c.id,
        name: "Late".into(),
    });
    assert!(matches!(
        rename.state(),
        MutationState::Rejected(MutationError::Conflict(_))
    ));

    store.release(3);
    let outcome = delete.outcome().await.expect("cascade delete");
    assert_eq!(outcome.deleted.len(), 3);

    let index = coordinator.snapshot();
    assert_eq!(index.len(), 1);
    assert!(index.contains(d.id));
    assert!(!coordinator.is_in_flight(a.id));
}

#[tokio::test]
async fn test_dropped_handle_still_commits() {
    let a = folder("A", None);
    let (store, coordinator) = gated_app(vec![a.clone()]).await;
    let mut snapshots = coordinator.subscribe();

    let handle = coordinator.submit(Mutation::Rename {
        folder_id: a.id,
        name: "Renamed".into(),
    });
    drop(handle);

    store.arrived().await;
    store.release(1);

    snapshots.changed().await.expect("snapshot republished");
    assert_eq!(snapshots.borrow().get(a.id).expect("a").name, "Renamed");
    assert_eq!(store.inner.folders()[0].name, "Renamed");
}

#[tokio::test]
async fn test_writes_into_folder_being_deleted_conflict() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let c = folder("C", None);
    let (store, coordinator) = gated_app(vec![a.clone(), b.clone(), c.clone()]).await;

    let delete = coordinator.submit(Mutation::Delete {
        folder_id: a.id,
        policy: DeletePolicy::Cascade,
    });
    assert_eq!(delete.state(), MutationState::Submitting);

    let create = coordinator.submit(Mutation::Create {
        name: "Orphan".into(),
        parent_id: Some(b.id),
    });
    assert_eq!(
        create.state(),
        MutationState::Rejected(MutationError::Conflict(b.id))
    );

    let mv = coordinator.submit(Mutation::Move {
        folder_id: c.id,
        parent_id: Some(a.id),
    });
    assert_eq!(
        mv.state(),
        MutationState::Rejected(MutationError::Conflict(a.id))
    );
    assert!(!coordinator.is_in_flight(c.id));

    store.release(2);
    let outcome = delete.outcome().await.expect("cascade delete");
    assert_eq!(outcome.deleted, vec![b.id, a.id]);

    let index = coordinator.snapshot();
    assert_eq!(index.len(), 1);
    assert!(index.contains(c.id));
    assert_eq!(store.inner.mutation_count(), 2);
}

#[tokio::test]
async fn test_slow_listing_does_not_overwrite_newer_snapshot() {
    let a = folder("A", None);
    let b = folder("B", None);
    // Listing 1 is the initial load; listing 2 follows the first commit.
    let store = Arc::new(HeldListingStore::new(vec![a.clone(), b.clone()], 2));
    let coordinator = SyncCoordinator::with_store(Arc::clone(&store), DeletePolicy::Cascade);
    coordinator.refresh().await.expect("initial snapshot");

    let first = coordinator.submit(Mutation::Rename {
        folder_id: a.id,
        name: "A2".into(),
    });
    store.listing_held().await;

    coordinator.rename(b.id, "B2").await.expect("second rename");
    let index = coordinator.snapshot();
    assert_eq!(index.get(a.id).expect("a").name, "A2");
    assert_eq!(index.get(b.id).expect("b").name, "B2");

    store.release_listing();
    let outcome = first.outcome().await.expect("first rename");
    assert!(outcome.refreshed);

    let index = coordinator.snapshot();
    assert_eq!(index.get(a.id).expect("a").name, "A2");
    assert_eq!(index.get(b.id).expect("b").name, "B2");
}
