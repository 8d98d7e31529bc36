//! Integration tests for concurrent writers on one document.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use serde_json::json;
use tokio::sync::Barrier;

use sowgen_core::ErrorKind;
use sowgen_core::result::AppResult;
use sowgen_core::types::SowId;
use sowgen_database::{MemoryCollection, SowCollection, SowFilter, SowMutation, SowQuery};
use sowgen_entity::comment::{ApprovalComment, CommentAction};
use sowgen_entity::sow::{Sow, SowPatch, SowStatus};

use crate::helpers::TestApp;

/// Holds the first `gated` reads until as many readers have arrived, so
/// every writer works from the same version.
#[derive(Debug)]
struct BarrierCollection {
    inner: MemoryCollection,
    barrier: Barrier,
    gated: AtomicUsize,
}

impl BarrierCollection {
    fn new(inner: MemoryCollection, readers: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(readers),
            gated: AtomicUsize::new(readers),
        }
    }
}

#[async_trait]
impl SowCollection for BarrierCollection {
    async fn find_one(&self, id: SowId) -> AppResult<Option<Sow>> {
        let found = self.inner.find_one(id).await?;
        let gate = self
            .gated
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if gate {
            self.barrier.wait().await;
        }
        Ok(found)
    }

    async fn insert_one(&self, sow: &Sow) -> AppResult<()> {
        self.inner.insert_one(sow).await
    }

    async fn find_one_and_update(
        &self,
        filter: SowFilter,
        mutation: SowMutation,
    ) -> AppResult<Option<Sow>> {
        self.inner.find_one_and_update(filter, mutation).await
    }

    async fn delete_one(&self, filter: SowFilter) -> AppResult<u64> {
        self.inner.delete_one(filter).await
    }

    fn find(&self, query: SowQuery) -> BoxStream<'_, AppResult<Sow>> {
        self.inner.find(query)
    }
}

#[tokio::test]
async fn test_racing_updates_have_exactly_one_winner() {
    let collection = MemoryCollection::new();
    let app = TestApp::over(
        collection.clone(),
        Arc::new(BarrierCollection::new(collection.clone(), 2)),
    );
    let sow = app.create_draft("Race").await;
    let id = sow.id.to_string();

    let left = SowPatch::from_json(&json!({ "projectName": "Left" })).unwrap();
    let right = SowPatch::from_json(&json!({ "projectName": "Right" })).unwrap();

    let (a, b) = tokio::join!(
        app.store.update(&id, &left, &app.client),
        app.store.update(&id, &right, &app.client),
    );

    let (winner, loser) = match (a, b) {
        (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
        other => panic!("Expected one winner and one loser, got {other:?}"),
    };
    assert_eq!(winner.version, 2);
    assert_eq!(loser.kind, ErrorKind::NotFound);
    assert!(loser.message.contains("modified concurrently"));

    let stored = collection.find_one(sow.id).await.unwrap().unwrap();
    assert_eq!(stored, winner);
    assert_eq!(stored.revision_history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_never_skip_versions() {
    let app = Arc::new(TestApp::new());
    let sow = app.create_draft("Stress").await;
    let id = sow.id.to_string();

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = Arc::clone(&app);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let patch = SowPatch::from_json(&json!({ "estimatedDurationWeeks": i + 1 })).unwrap();
            app.store.update(&id, &patch, &app.client).await
        }));
    }

    let mut successes = 0u64;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::NotFound),
        }
    }

    let stored = app.store.get(&id).await.unwrap();
    assert!(successes >= 1);
    assert_eq!(stored.version, 1 + successes);
    assert_eq!(stored.revision_history.len() as u64, successes);
    for (i, revision) in stored.revision_history.iter().enumerate() {
        assert_eq!(revision.version, i as u64 + 2);
    }
}

/// Commits a pending comment right after the next read, so it lands
/// between an updater's read and its conditional write.
#[derive(Debug)]
struct InterleavingCollection {
    inner: MemoryCollection,
    pending: Mutex<Option<ApprovalComment>>,
}

impl InterleavingCollection {
    fn new(inner: MemoryCollection) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }

    fn comment_after_next_read(&self, comment: ApprovalComment) {
        *self.pending.lock().unwrap() = Some(comment);
    }
}

#[async_trait]
impl SowCollection for InterleavingCollection {
    async fn find_one(&self, id: SowId) -> AppResult<Option<Sow>> {
        let found = self.inner.find_one(id).await?;
        let pending = self.pending.lock().unwrap().take();
        if let Some(comment) = pending {
            self.inner
                .find_one_and_update(SowFilter::by_id(id), SowMutation::AppendComment(comment))
                .await?;
        }
        Ok(found)
    }

    async fn insert_one(&self, sow: &Sow) -> AppResult<()> {
        self.inner.insert_one(sow).await
    }

    async fn find_one_and_update(
        &self,
        filter: SowFilter,
        mutation: SowMutation,
    ) -> AppResult<Option<Sow>> {
        self.inner.find_one_and_update(filter, mutation).await
    }

    async fn delete_one(&self, filter: SowFilter) -> AppResult<u64> {
        self.inner.delete_one(filter).await
    }

    fn find(&self, query: SowQuery) -> BoxStream<'_, AppResult<Sow>> {
        self.inner.find(query)
    }
}

fn interleaved_app() -> (TestApp, Arc<InterleavingCollection>) {
    let collection = MemoryCollection::new();
    let backend = Arc::new(InterleavingCollection::new(collection.clone()));
    let app = TestApp::over(collection, backend.clone());
    (app, backend)
}

#[tokio::test]
async fn test_comment_does_not_disturb_pending_update() {
    let (app, backend) = interleaved_app();
    let sow = app.create_draft("Interleaved").await;
    let id = sow.id.to_string();

    let remark = ApprovalComment::new(
        &app.approver,
        "Checking in",
        CommentAction::Comment,
        Utc::now(),
    );
    backend.comment_after_next_read(remark.clone());

    let submitted = app
        .store
        .transition(&id, SowStatus::Pending, &app.client, None)
        .await
        .unwrap();

    assert_eq!(submitted.version, 2);
    assert_eq!(submitted.status, SowStatus::Pending);
    assert_eq!(submitted.approval_history, vec![remark.clone()]);
    assert!(submitted.updated_at >= remark.timestamp);
    assert_eq!(
        submitted.revision_history[0].snapshot.approval_history,
        vec![remark]
    );
    assert_eq!(app.collection.find_one(sow.id).await.unwrap().unwrap(), submitted);
}

#[tokio::test]
async fn test_comment_during_edit_survives_the_write() {
    let (app, backend) = interleaved_app();
    let sow = app.create_draft("Interleaved").await;
    let id = sow.id.to_string();

    backend.comment_after_next_read(ApprovalComment::new(
        &app.approver,
        "Scope looks thin",
        CommentAction::Comment,
        Utc::now(),
    ));
    let patch = SowPatch::from_json(&json!({ "projectName": "Interleaved v2" })).unwrap();
    let edited = app.store.update(&id, &patch, &app.client).await.unwrap();

    assert_eq!(edited.version, 2);
    assert_eq!(edited.project_name, "Interleaved v2");
    assert_eq!(edited.approval_history.len(), 1);
    assert_eq!(edited.approval_history[0].comment, "Scope looks thin");

    // Decisions committed later still see the remark.
    app.store
        .transition(&id, SowStatus::Pending, &app.client, None)
        .await
        .unwrap();
    let approved = app
        .store
        .transition(&id, SowStatus::Approved, &app.approver, None)
        .await
        .unwrap();
    assert_eq!(approved.approval_history.len(), 2);
    assert_eq!(approved.approval_history[1].action, CommentAction::Approved);
}
