//! Create, rename and move through the coordinator.

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;
use foldertree_remote::FolderStore;
use foldertree_service::{
    GENERIC_FAILURE_MESSAGE, Mutation, MutationError, MutationState, Rejection,
};

use crate::helpers::{TestApp, folder};

#[tokio::test]
async fn test_blank_name_rejected_then_root_created() {
    let app = TestApp::new(Vec::new(), Vec::new()).await;

    let err = app.coordinator.create("  ", None).await.unwrap_err();
    assert_eq!(err, MutationError::Rejected(Rejection::InvalidName));
    assert_eq!(app.store.mutation_count(), 0);

    let outcome = app.coordinator.create("Memes", None).await.expect("create");
    let created = outcome.folder.expect("created folder");
    assert!(created.is_root());

    let index = app.coordinator.snapshot();
    assert_eq!(index.roots().len(), 1);
    assert_eq!(index.get(created.id).map(|f| f.name.as_str()), Some("Memes"));
}

#[tokio::test]
async fn test_create_under_unknown_parent_is_rejected() {
    let app = TestApp::new(Vec::new(), Vec::new()).await;
    let missing = FolderId::new();

    let err = app.coordinator.create("Child", Some(missing)).await.unwrap_err();
    assert_eq!(err, MutationError::Rejected(Rejection::UnknownParent(missing)));
    assert!(!err.is_retriable());
    assert_eq!(app.store.mutation_count(), 0);
}

#[tokio::test]
async fn test_move_scenario() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let c = folder("C", Some(&b));
    let app = TestApp::new(vec![a.clone(), b.clone(), c.clone()], Vec::new()).await;

    let err = app.coordinator.move_folder(a.id, Some(c.id)).await.unwrap_err();
    assert_eq!(
        err,
        MutationError::Rejected(Rejection::CyclicMove {
            folder: a.id,
            target: c.id
        })
    );
    assert_eq!(app.store.mutation_count(), 0);

    app.coordinator.move_folder(c.id, None).await.expect("move to root");
    assert_eq!(app.remote_parent(c.id), None);
    assert!(app.coordinator.snapshot().get(c.id).expect("c").is_root());
    assert_eq!(app.coordinator.snapshot().roots().len(), 2);
}

#[tokio::test]
async fn test_rename_trims_and_rebuilds() {
    let a = folder("A", None);
    let app = TestApp::new(vec![a.clone()], Vec::new()).await;

    let outcome = app.coordinator.rename(a.id, "  Clips ").await.expect("rename");
    assert!(outcome.refreshed);
    assert_eq!(app.coordinator.snapshot().get(a.id).expect("a").name, "Clips");

    let unknown = FolderId::new();
    let err = app.coordinator.rename(unknown, "Nope").await.unwrap_err();
    assert_eq!(err, MutationError::Rejected(Rejection::UnknownFolder(unknown)));
}

#[tokio::test]
async fn test_remote_failure_is_terminal_and_reported() {
    let a = folder("A", None);
    let app = TestApp::new(vec![a.clone()], Vec::new()).await;

    app.store
        .fail_next(AppError::conflict("Remote store returned 409").with_detail("Name already taken"));
    let handle = app.coordinator.submit(Mutation::Rename {
        folder_id: a.id,
        name: "Taken".into(),
    });
    let state = handle.watch();
    let err = handle.outcome().await.unwrap_err();

    assert_eq!(err.user_message(), "Name already taken");
    assert!(err.is_retriable());
    assert!(matches!(*state.borrow(), MutationState::Failed(_)));
    assert_eq!(app.store.mutation_count(), 1);
    assert_eq!(app.coordinator.snapshot().get(a.id).expect("a").name, "A");

    app.store.fail_next(AppError::external_service("connection reset"));
    let err = app.coordinator.rename(a.id, "Again").await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(app.store.mutation_count(), 2);
}

#[tokio::test]
async fn test_stale_snapshot_surfaces_server_refusal() {
    let a = folder("A", None);
    let b = folder("B", None);
    let app = TestApp::new(vec![a.clone(), b.clone()], Vec::new()).await;

    // Another session deletes B after our snapshot was taken.
    app.store.delete_folder(b.id).await.expect("remote delete");

    let err = app.coordinator.move_folder(a.id, Some(b.id)).await.unwrap_err();
    assert!(matches!(err, MutationError::RemoteFailure { .. }));
    assert_eq!(err.user_message(), "Target folder not found");
    assert!(!app.coordinator.snapshot().contains(b.id));
}
