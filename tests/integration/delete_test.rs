//! Folder deletion under both policies.

use foldertree_core::error::AppError;
use foldertree_core::types::DeletePolicy;
use foldertree_service::MutationError;

use crate::helpers::{TestApp, folder, video_in};

#[tokio::test]
async fn test_cascade_removes_subtree_and_unfiles_videos() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let c = folder("C", Some(&b));
    let d = folder("D", None);
    let videos = vec![
        video_in(Some(&a)),
        video_in(Some(&c)),
        video_in(Some(&d)),
        video_in(None),
    ];
    let app = TestApp::new(
        vec![a.clone(), b.clone(), c.clone(), d.clone()],
        videos.clone(),
    )
    .await;

    let outcome = app
        .coordinator
        .delete_with(a.id, DeletePolicy::Cascade)
        .await
        .expect("cascade delete");

    assert_eq!(outcome.deleted, vec![c.id, b.id, a.id]);
    assert_eq!(outcome.videos_reassigned, 2);
    assert!(outcome.promoted.is_empty());

    for id in [a.id, b.id, c.id] {
        assert!(!app.remote_has(id));
        assert!(!app.coordinator.snapshot().contains(id));
    }
    assert!(app.remote_has(d.id));

    let stored = app.store.videos();
    assert_eq!(stored.len(), 4, "videos are never deleted");
    assert_eq!(stored[0].folder_id, None);
    assert_eq!(stored[1].folder_id, None);
    assert_eq!(stored[2].folder_id, Some(d.id));
}

#[tokio::test]
async fn test_promote_reparents_children_and_videos() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let c = folder("C", Some(&b));
    let c2 = folder("C2", Some(&b));
    let videos = vec![video_in(Some(&b)), video_in(Some(&c))];
    let app = TestApp::new(
        vec![a.clone(), b.clone(), c.clone(), c2.clone()],
        videos,
    )
    .await;

    let outcome = app.coordinator.delete(b.id).await.expect("promote delete");

    assert_eq!(outcome.deleted, vec![b.id]);
    assert_eq!(outcome.promoted, vec![c.id, c2.id]);
    assert_eq!(outcome.videos_reassigned, 1);

    assert!(!app.remote_has(b.id));
    assert_eq!(app.remote_parent(c.id), Some(a.id));
    assert_eq!(app.remote_parent(c2.id), Some(a.id));

    let stored = app.store.videos();
    assert_eq!(stored[0].folder_id, Some(a.id));
    assert_eq!(stored[1].folder_id, Some(c.id));

    let index = app.coordinator.snapshot();
    assert_eq!(index.children_of(Some(a.id)).len(), 2);
}

#[tokio::test]
async fn test_promote_root_makes_children_roots() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let app = TestApp::new(vec![a.clone(), b.clone()], vec![video_in(Some(&a))]).await;

    app.coordinator
        .delete_with(a.id, DeletePolicy::Promote)
        .await
        .expect("promote delete");

    assert_eq!(app.remote_parent(b.id), None);
    assert_eq!(app.store.videos()[0].folder_id, None);
    assert!(app.coordinator.snapshot().get(b.id).expect("b").is_root());
}

#[tokio::test]
async fn test_failed_delete_leaves_valid_tree() {
    let a = folder("A", None);
    let b = folder("B", Some(&a));
    let app = TestApp::new(vec![a.clone(), b.clone()], Vec::new()).await;

    app.store
        .fail_next(AppError::service_unavailable("Remote store returned 503"));
    let err = app
        .coordinator
        .delete_with(a.id, DeletePolicy::Cascade)
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::RemoteFailure { .. }));
    assert!(app.remote_has(a.id) && app.remote_has(b.id));
    assert_eq!(app.coordinator.snapshot().len(), 2);
    assert!(!app.coordinator.is_in_flight(a.id));
    assert!(!app.coordinator.is_in_flight(b.id));

    app.coordinator
        .delete_with(a.id, DeletePolicy::Cascade)
        .await
        .expect("retry succeeds");
    assert!(app.coordinator.snapshot().is_empty());
}
