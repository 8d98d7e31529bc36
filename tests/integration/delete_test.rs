//! Integration tests for ownership-scoped deletion.

use sowgen_core::ErrorKind;
use sowgen_core::types::SowId;
use sowgen_entity::sow::SowStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_owner_deletes_own_document() {
    let app = TestApp::new();
    let sow = app.create_draft("Disposable").await;
    let id = sow.id.to_string();

    app.store.delete_as(&id, &app.client).await.unwrap();

    assert!(app.collection.is_empty().await);
    let err = app.store.get(&id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_other_client_cannot_delete() {
    let app = TestApp::new();
    let sow = app.create_draft("Protected").await;
    let id = sow.id.to_string();

    let err = app
        .store
        .delete(&id, app.other_client.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert_eq!(app.store.get(&id).await.unwrap(), sow);
}

#[tokio::test]
async fn test_privileged_delete_ignores_owner() {
    let app = TestApp::new();
    let sow = app.create_draft("Cleanup").await;
    app.store
        .transition(&sow.id.to_string(), SowStatus::Pending, &app.client, None)
        .await
        .unwrap();

    app.store
        .delete_as(&sow.id.to_string(), &app.admin)
        .await
        .unwrap();
    assert_eq!(app.collection.len().await, 0);
}

#[tokio::test]
async fn test_approver_has_no_delete_right() {
    let app = TestApp::new();
    let sow = app.create_draft("Kept").await;

    let err = app
        .store
        .delete_as(&sow.id.to_string(), &app.approver)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert_eq!(app.collection.len().await, 1);
}

#[tokio::test]
async fn test_missing_documents_are_not_found() {
    let app = TestApp::new();

    let err = app
        .store
        .delete(&SowId::new().to_string(), app.client.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .store
        .delete("definitely-not-an-id", app.admin.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_second_delete_reports_not_found() {
    let app = TestApp::new();
    let sow = app.create_draft("Twice").await;
    let id = sow.id.to_string();

    app.store.delete(&id, app.client.id, false).await.unwrap();
    let err = app
        .store
        .delete(&id, app.client.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_document_outranks_missing_right() {
    let app = TestApp::new();

    let err = app
        .store
        .delete_as(&SowId::new().to_string(), &app.approver)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
