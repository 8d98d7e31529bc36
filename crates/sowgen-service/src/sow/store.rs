//! The authoritative SOW document store.
//!
//! Every mutation is a single conditional call on the collection. The
//! permission and version checks travel in the [`SowFilter`], so nothing
//! another writer does between the read and the write can slip through.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sowgen_auth::rbac::{SowAction, SowEnforcer};
use sowgen_core::error::AppError;
use sowgen_core::result::AppResult;
use sowgen_core::traits::Service;
use sowgen_core::types::{RevisionId, SowId, UserId};
use sowgen_database::{RevisionDelta, SowCollection, SowFilter, SowMutation, SowQuery};
use sowgen_entity::comment::{ApprovalComment, CommentAction};
use sowgen_entity::revision::SowRevision;
use sowgen_entity::sow::{CreateSow, Sow, SowFieldName, SowPatch, SowStatus};
use sowgen_entity::user::Actor;

use super::revision::RevisionEngine;
use super::workflow::WorkflowStateMachine;

/// One entry of the recent-changes feed: a revision plus the document it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChange {
    pub sow_id: SowId,
    pub project_name: String,
    pub revision_id: RevisionId,
    /// Version the revision produced.
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub changed_by: UserId,
    pub changed_by_name: String,
    pub summary: String,
    /// Number of fields the revision changed.
    pub change_count: usize,
}

/// Owns SOW documents and their audit trail.
#[derive(Clone)]
pub struct DocumentStore {
    /// Backing collection.
    collection: Arc<dyn SowCollection>,
    /// Diff and revision builder.
    revisions: RevisionEngine,
    /// Status change validation.
    workflow: WorkflowStateMachine,
    /// Role × action table.
    enforcer: Arc<SowEnforcer>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("workflow", &self.workflow)
            .field("enforcer", &self.enforcer)
            .finish()
    }
}

impl Service for DocumentStore {}

impl DocumentStore {
    /// Creates a new document store.
    pub fn new(
        collection: Arc<dyn SowCollection>,
        workflow: WorkflowStateMachine,
        enforcer: Arc<SowEnforcer>,
    ) -> Self {
        Self {
            collection,
            revisions: RevisionEngine::new(),
            workflow,
            enforcer,
        }
    }

    /// Creates a store with the default workflow policy and role table.
    pub fn with_defaults(collection: Arc<dyn SowCollection>) -> Self {
        Self::new(
            collection,
            WorkflowStateMachine::default(),
            Arc::new(SowEnforcer::new()),
        )
    }

    /// Create a draft at version 1 owned by `input.client_id`.
    pub async fn create(&self, input: CreateSow, actor: &Actor) -> AppResult<Sow> {
        let owner: UserId = input
            .client_id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid owner id '{}'", input.client_id)))?;
        if input.project_name.trim().is_empty() {
            return Err(AppError::validation("Project name must not be empty"));
        }

        let sow = Sow::create(input, owner, Utc::now());
        self.enforcer.require(actor, SowAction::Create, Some(&sow))?;
        self.collection.insert_one(&sow).await?;

        info!(sow_id = %sow.id, client_id = %owner, actor_id = %actor.id, "SOW created");
        Ok(sow)
    }

    /// Fetch a document. Malformed ids are reported as not found.
    pub async fn get(&self, id: &str) -> AppResult<Sow> {
        let id = parse_id(id)?;
        self.collection
            .find_one(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a document `actor` is allowed to read.
    pub async fn get_for(&self, id: &str, actor: &Actor) -> AppResult<Sow> {
        let sow = self.get(id).await?;
        self.enforcer.require(actor, SowAction::Read, Some(&sow))?;
        Ok(sow)
    }

    /// Stream documents, newest first, optionally filtered by owner and
    /// status. Nothing is read until the stream is polled.
    pub fn list(
        &self,
        owner: Option<UserId>,
        status: Option<SowStatus>,
    ) -> BoxStream<'_, AppResult<Sow>> {
        self.collection.find(SowQuery {
            client_id: owner,
            status,
        })
    }

    /// Stream the documents `actor` may read.
    pub fn list_for(
        &self,
        actor: &Actor,
        status: Option<SowStatus>,
    ) -> BoxStream<'_, AppResult<Sow>> {
        match self.enforcer.owner_predicate(actor, SowAction::Read) {
            Some(owner) => self.list(owner, status),
            None => {
                let err = AppError::forbidden(format!("Role '{}' may not list SOWs", actor.role));
                stream::once(async move { Err(err) }).boxed()
            }
        }
    }

    /// Apply a partial update.
    ///
    /// A patch that changes nothing returns the current document untouched.
    /// Otherwise the new field values, the version bump and the revision
    /// commit together or not at all.
    pub async fn update(&self, id: &str, patch: &SowPatch, actor: &Actor) -> AppResult<Sow> {
        let id = parse_id(id)?;
        self.commit_patch(id, patch, actor, None).await
    }

    /// Move a document to `to`.
    ///
    /// Approvals, rejections and change requests always add an entry to the
    /// approval history; other moves add one only when `comment` is given.
    /// The entry is written by the same conditional write as the status.
    pub async fn transition(
        &self,
        id: &str,
        to: SowStatus,
        actor: &Actor,
        comment: Option<String>,
    ) -> AppResult<Sow> {
        let id = parse_id(id)?;
        let note = comment.or_else(|| {
            (CommentAction::for_status(to) != CommentAction::Comment).then(String::new)
        });
        self.commit_patch(id, &SowPatch::status(to), actor, note)
            .await
    }

    /// Append a plain comment. Leaves version and revision history alone.
    pub async fn append_comment(&self, id: &str, actor: &Actor, text: &str) -> AppResult<Sow> {
        let id = parse_id(id)?;
        self.push_comment(id, actor, text).await
    }

    async fn push_comment(&self, id: SowId, actor: &Actor, text: &str) -> AppResult<Sow> {
        if text.trim().is_empty() {
            return Err(AppError::validation("Comment must not be empty"));
        }

        let owner = self
            .enforcer
            .owner_predicate(actor, SowAction::Comment)
            .ok_or_else(|| {
                AppError::forbidden(format!("Role '{}' may not comment on SOWs", actor.role))
            })?;
        let filter = with_owner(SowFilter::by_id(id), owner);
        let comment = ApprovalComment::new(actor, text, CommentAction::Comment, Utc::now());

        match self
            .collection
            .find_one_and_update(filter, SowMutation::AppendComment(comment))
            .await?
        {
            Some(sow) => {
                info!(sow_id = %id, actor_id = %actor.id, "Comment added");
                Ok(sow)
            }
            None => Err(self.ownership_miss(id, actor.id).await),
        }
    }

    /// Hard-delete a document.
    ///
    /// One conditional delete whose predicate is "id matches and (privileged
    /// or owned by `actor_id`)". Only when nothing was deleted is the
    /// document re-read, to tell `Forbidden` from `NotFound`.
    pub async fn delete(&self, id: &str, actor_id: UserId, is_privileged: bool) -> AppResult<()> {
        let id = parse_id(id)?;
        let filter = if is_privileged {
            SowFilter::by_id(id)
        } else {
            SowFilter::by_id(id).owned_by(actor_id)
        };

        if self.collection.delete_one(filter).await? > 0 {
            info!(sow_id = %id, actor_id = %actor_id, privileged = is_privileged, "SOW deleted");
            return Ok(());
        }
        Err(self.ownership_miss(id, actor_id).await)
    }

    /// [`DocumentStore::delete`] with the privilege flag taken from the
    /// role table.
    pub async fn delete_as(&self, id: &str, actor: &Actor) -> AppResult<()> {
        if self.enforcer.owner_predicate(actor, SowAction::Delete).is_none() {
            self.get(id).await?;
            return Err(AppError::forbidden(format!(
                "Role '{}' may not delete SOWs",
                actor.role
            )));
        }
        self.delete(id, actor.id, self.enforcer.is_privileged(actor.role))
            .await
    }

    /// The revision history of a document, oldest first.
    pub async fn history(&self, id: &str) -> AppResult<Vec<SowRevision>> {
        Ok(self.get(id).await?.revision_history)
    }

    /// Revisions across all documents (or those of `owner`), newest first,
    /// at most `limit` of them. Ties on timestamp go to the higher version.
    pub async fn recent_changes(
        &self,
        owner: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<RecentChange>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut feed: Vec<RecentChange> = self
            .list(owner, None)
            .try_fold(Vec::new(), |mut acc, sow| async move {
                acc.extend(sow.revision_history.iter().map(|revision| RecentChange {
                    sow_id: sow.id,
                    project_name: sow.project_name.clone(),
                    revision_id: revision.id,
                    version: revision.version,
                    timestamp: revision.timestamp,
                    changed_by: revision.changed_by,
                    changed_by_name: revision.changed_by_name.clone(),
                    summary: revision.summary.clone(),
                    change_count: revision.changes.len(),
                }));
                Ok(acc)
            })
            .await?;

        feed.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.version.cmp(&a.version))
        });
        feed.truncate(limit);
        debug!(count = feed.len(), limit, "Recent changes collected");
        Ok(feed)
    }

    /// The diff engine used for revisions.
    pub fn revisions(&self) -> &RevisionEngine {
        &self.revisions
    }

    async fn commit_patch(
        &self,
        id: SowId,
        patch: &SowPatch,
        actor: &Actor,
        note: Option<String>,
    ) -> AppResult<Sow> {
        let current = self
            .collection
            .find_one(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.enforcer.require(actor, SowAction::Read, Some(&current))?;

        let changes = self.revisions.diff(&current, patch);
        if changes.is_empty() {
            // A remark on a move to the current status is kept as a comment.
            if let Some(text) = note.filter(|t| !t.trim().is_empty()) {
                return self.push_comment(id, actor, &text).await;
            }
            debug!(sow_id = %id, version = current.version, "Update changes nothing");
            return Ok(current);
        }

        let mut owner = None;
        if changes.iter().any(|c| c.field != SowFieldName::Status) {
            owner = self
                .enforcer
                .owner_predicate(actor, SowAction::Edit)
                .ok_or_else(|| {
                    warn!(sow_id = %id, actor_id = %actor.id, "Edit denied");
                    AppError::forbidden(format!("Role '{}' may not edit SOWs", actor.role))
                })?;
        }

        let status_change = changes
            .iter()
            .any(|c| c.field == SowFieldName::Status)
            .then(|| patch.requested_status())
            .flatten();
        if let Some(to) = status_change {
            let action = self
                .workflow
                .check(current.status, to, actor.role)
                .inspect_err(|e| {
                    warn!(sow_id = %id, actor_id = %actor.id, error = %e, "Transition denied");
                })?;
            if let Some(Some(required)) = self.enforcer.owner_predicate(actor, action) {
                owner = Some(required);
            }
        }

        if owner.is_some_and(|o| !current.is_owned_by(&o)) {
            return Err(AppError::forbidden(format!("SOW {id} belongs to another client")));
        }

        let now = current.updated_at.max(Utc::now());
        let mut delta = RevisionDelta {
            fields: patch.fields().cloned().collect(),
            revision: self.revisions.build_revision(&current, changes, actor, now),
            submitted_at: None,
            approved_at: None,
            approval_entry: None,
        };
        if let Some(to) = status_change {
            match to {
                SowStatus::Pending => delta.submitted_at = Some(now),
                SowStatus::Approved => delta.approved_at = Some(now),
                _ => {}
            }
            delta.approval_entry = note
                .map(|text| ApprovalComment::new(actor, text, CommentAction::for_status(to), now));
        }
        let summary = delta.revision.summary.clone();

        // The version guard pins every tracked field; comments appended since
        // the read survive because only the delta is written.
        let filter = with_owner(SowFilter::by_id(id).at_version(current.version), owner);
        match self
            .collection
            .find_one_and_update(filter, SowMutation::Revise(Box::new(delta)))
            .await?
        {
            Some(updated) => {
                info!(
                    sow_id = %id,
                    version = updated.version,
                    actor_id = %actor.id,
                    summary = %summary,
                    "SOW updated"
                );
                Ok(updated)
            }
            None => Err(self.version_miss(id, current.version).await),
        }
    }

    /// Explain a conditional update that matched nothing.
    async fn version_miss(&self, id: SowId, expected: u64) -> AppError {
        match self.collection.find_one(id).await {
            Err(e) => e,
            Ok(None) => not_found(id),
            Ok(Some(sow)) if sow.version != expected => {
                debug!(sow_id = %id, expected, found = sow.version, "Lost update race");
                AppError::not_found(format!("SOW {id} was modified concurrently"))
            }
            Ok(Some(_)) => AppError::forbidden(format!("SOW {id} belongs to another client")),
        }
    }

    /// Explain an owner-scoped write that matched nothing.
    async fn ownership_miss(&self, id: SowId, actor_id: UserId) -> AppError {
        match self.collection.find_one(id).await {
            Err(e) => e,
            Ok(None) => not_found(id),
            Ok(Some(_)) => {
                warn!(sow_id = %id, actor_id = %actor_id, "Write denied: not the owner");
                AppError::forbidden(format!("SOW {id} belongs to another client"))
            }
        }
    }
}

fn parse_id(id: &str) -> AppResult<SowId> {
    id.parse()
        .map_err(|_| AppError::not_found(format!("SOW '{id}' not found")))
}

fn not_found(id: SowId) -> AppError {
    AppError::not_found(format!("SOW {id} not found"))
}

fn with_owner(filter: SowFilter, owner: Option<UserId>) -> SowFilter {
    match owner {
        Some(o) => filter.owned_by(o),
        None => filter,
    }
}
