//! Integration tests for the create → edit → submit → decide lifecycle.

use futures::TryStreamExt;
use serde_json::json;

use sowgen_core::ErrorKind;
use sowgen_entity::comment::CommentAction;
use sowgen_entity::sow::{Sow, SowPatch, SowStatus};
use sowgen_service::StatsService;

use crate::helpers::TestApp;

fn patch(value: serde_json::Value) -> SowPatch {
    SowPatch::from_json(&value).expect("Failed to decode patch")
}

#[tokio::test]
async fn test_full_approval_cycle() {
    let app = TestApp::new();
    let sow = app.create_draft("Data Center Exit").await;
    let id = sow.id.to_string();
    assert_eq!(sow.version, 1);
    assert_eq!(sow.status, SowStatus::Draft);

    let edited = app
        .store
        .update(
            &id,
            &patch(json!({ "projectName": "Data Center Exit 2025", "estimatedValue": 120000.0 })),
            &app.client,
        )
        .await
        .unwrap();
    assert_eq!(edited.version, 2);
    assert_eq!(
        edited.revision_history[0].summary,
        "Updated Project Name, Estimated Value"
    );

    let submitted = app
        .store
        .transition(&id, SowStatus::Pending, &app.client, None)
        .await
        .unwrap();
    assert_eq!(submitted.version, 3);
    assert!(submitted.submitted_at.is_some());
    assert!(submitted.approval_history.is_empty());

    let returned = app
        .store
        .transition(
            &id,
            SowStatus::ChangesRequested,
            &app.approver,
            Some("Add a rollback plan".into()),
        )
        .await
        .unwrap();
    assert_eq!(returned.version, 4);
    assert_eq!(returned.approval_history.len(), 1);
    assert_eq!(
        returned.approval_history[0].action,
        CommentAction::ChangesRequested
    );
    assert_eq!(returned.approval_history[0].approver_id, app.approver.id);

    app.store
        .update(
            &id,
            &patch(json!({ "projectDescription": "Includes rollback plan" })),
            &app.client,
        )
        .await
        .unwrap();
    app.store
        .transition(&id, SowStatus::Pending, &app.client, None)
        .await
        .unwrap();

    let approved = app
        .store
        .transition(&id, SowStatus::Approved, &app.approver, None)
        .await
        .unwrap();
    assert_eq!(approved.version, 7);
    assert_eq!(approved.status, SowStatus::Approved);
    assert!(approved.approved_at >= approved.submitted_at);
    assert_eq!(approved.approval_history.len(), 2);
    assert_eq!(approved.approval_history[1].action, CommentAction::Approved);
    assert_eq!(approved.approval_history[1].comment, "");

    let history = app.store.history(&id).await.unwrap();
    assert_eq!(history.len() as u64, approved.version - 1);
    for (i, revision) in history.iter().enumerate() {
        assert_eq!(revision.version, i as u64 + 2);
        assert_eq!(revision.snapshot.version, revision.version - 1);
    }
    for pair in history.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_history_replays_to_current_state() {
    let app = TestApp::new();
    let sow = app.create_draft("Replay").await;
    let id = sow.id.to_string();

    for (i, value) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        app.store
            .update(
                &id,
                &patch(json!({ "estimatedValue": value, "estimatedDurationWeeks": i + 1 })),
                &app.client,
            )
            .await
            .unwrap();
    }
    app.store
        .transition(&id, SowStatus::Pending, &app.client, None)
        .await
        .unwrap();

    let current = app.store.get(&id).await.unwrap();
    let states = app
        .store
        .revisions()
        .replay(&current.revision_history[0].snapshot, &current.revision_history)
        .unwrap();

    assert_eq!(states.len(), current.revision_history.len() + 1);
    assert_eq!(states.last(), Some(&current.tracked_state()));
    assert_eq!(states[0], sow.tracked_state());
}

#[tokio::test]
async fn test_noop_patch_keeps_version() {
    let app = TestApp::new();
    let sow = app.create_draft("Unchanged").await;

    let same = app
        .store
        .update(
            &sow.id.to_string(),
            &patch(json!({ "projectName": "Unchanged", "version": 42, "id": "ignored" })),
            &app.client,
        )
        .await
        .unwrap();
    assert_eq!(same.version, 1);
    assert!(same.revision_history.is_empty());
}

#[tokio::test]
async fn test_role_boundaries() {
    let app = TestApp::new();
    let sow = app.create_draft("Boundaries").await;
    let id = sow.id.to_string();

    let err = app
        .store
        .update(&id, &patch(json!({ "projectName": "Hijack" })), &app.approver)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .store
        .update(&id, &patch(json!({ "projectName": "Hijack" })), &app.other_client)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .store
        .transition(&id, SowStatus::Approved, &app.client, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);

    let err = app
        .store
        .transition(&id, SowStatus::Pending, &app.approver, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);

    // Admins may reopen anything.
    app.store
        .transition(&id, SowStatus::Approved, &app.admin, Some("Fast-tracked".into()))
        .await
        .unwrap();
    let reopened = app
        .store
        .transition(&id, SowStatus::Draft, &app.admin, None)
        .await
        .unwrap();
    assert_eq!(reopened.version, 3);
    assert_eq!(app.store.get(&id).await.unwrap(), reopened);
}

#[tokio::test]
async fn test_comments_leave_version_alone() {
    let app = TestApp::new();
    let sow = app.create_draft("Comments").await;
    let id = sow.id.to_string();

    let commented = app
        .store
        .append_comment(&id, &app.approver, "Looks reasonable")
        .await
        .unwrap();
    assert_eq!(commented.version, 1);
    assert!(commented.revision_history.is_empty());
    assert_eq!(commented.approval_history.len(), 1);
    assert_eq!(commented.approval_history[0].action, CommentAction::Comment);
    assert!(commented.updated_at >= sow.updated_at);

    let err = app
        .store
        .append_comment(&id, &app.other_client, "Not mine")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .store
        .append_comment(&id, &app.client, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new();

    let err = app.store.get("not-a-uuid").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let missing = sowgen_core::types::SowId::new().to_string();
    let err = app
        .store
        .update(&missing, &patch(json!({ "projectName": "x" })), &app.client)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .store
        .transition(&missing, SowStatus::Pending, &app.client, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_listing_is_scoped_by_role() {
    let app = TestApp::new();
    app.create_draft("First").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.create_draft("Second").await;
    app.store
        .create(
            sowgen_entity::sow::CreateSow::new("Elsewhere", app.other_client.id.to_string()),
            &app.other_client,
        )
        .await
        .unwrap();

    let mine: Vec<Sow> = app
        .store
        .list_for(&app.client, None)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].project_name, "Second");

    let all: Vec<Sow> = app
        .store
        .list_for(&app.approver, None)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let pending: Vec<Sow> = app
        .store
        .list(None, Some(SowStatus::Pending))
        .try_collect()
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_stats_reflect_decisions() {
    let app = TestApp::new();
    let approved = app.create_draft("Approved").await;
    let rejected = app.create_draft("Rejected").await;
    app.create_draft("Draft").await;

    for (sow, outcome) in [(&approved, SowStatus::Approved), (&rejected, SowStatus::Rejected)] {
        let id = sow.id.to_string();
        app.store
            .transition(&id, SowStatus::Pending, &app.client, None)
            .await
            .unwrap();
        app.store
            .transition(&id, outcome, &app.approver, Some("Decided".into()))
            .await
            .unwrap();
    }

    let stats = StatsService::new(std::sync::Arc::new(app.collection.clone()))
        .compute(Some(app.client.id))
        .await
        .unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.draft, 1);
    assert_eq!(stats.approval_rate, 33);
    assert_eq!(stats.avg_approval_time_days, 0.0);
}

#[tokio::test]
async fn test_offline_store_is_a_persistence_fault() {
    let app = TestApp::new();
    let sow = app.create_draft("Offline").await;
    app.collection.set_offline(true);

    let err = app.store.get(&sow.id.to_string()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PersistenceUnavailable);
    assert!(err.is_fault());

    let err = app
        .store
        .update(&sow.id.to_string(), &patch(json!({ "projectName": "x" })), &app.client)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PersistenceUnavailable);

    app.collection.set_offline(false);
    assert_eq!(app.store.get(&sow.id.to_string()).await.unwrap().version, 1);
}

#[tokio::test]
async fn test_recent_changes_feed_spans_documents() {
    let app = TestApp::new();
    let alpha = app.create_draft("Alpha").await;
    let beta = app.create_draft("Beta").await;

    app.store
        .update(
            &alpha.id.to_string(),
            &patch(json!({ "estimatedValue": 5000.0 })),
            &app.client,
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.store
        .transition(&beta.id.to_string(), SowStatus::Pending, &app.client, None)
        .await
        .unwrap();

    let feed = app.store.recent_changes(None, 5).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].project_name, "Beta");
    assert_eq!(feed[0].summary, "Updated Status");
    assert_eq!(feed[1].project_name, "Alpha");
    assert_eq!(feed[1].version, 2);
    assert_eq!(feed[1].changed_by_name, app.client.name);

    let theirs = app
        .store
        .recent_changes(Some(app.other_client.id), 5)
        .await
        .unwrap();
    assert!(theirs.is_empty());
}
