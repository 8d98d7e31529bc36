//! Document collection contract and predicate types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use sowgen_core::error::AppError;
use sowgen_core::result::AppResult;
use sowgen_core::types::{SowId, UserId};
use sowgen_entity::comment::ApprovalComment;
use sowgen_entity::revision::SowRevision;
use sowgen_entity::sow::{Sow, SowField, SowStatus};

/// Match predicate for single-document conditional operations.
///
/// Every populated condition must hold for the document to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SowFilter {
    /// Document id (always required).
    pub id: SowId,
    /// Expected current version, for compare-and-set writes.
    pub version: Option<u64>,
    /// Required owner, for owner-scoped permission checks.
    pub owner: Option<UserId>,
}

impl SowFilter {
    /// Match a document by id only.
    pub fn by_id(id: SowId) -> Self {
        Self {
            id,
            version: None,
            owner: None,
        }
    }

    /// Additionally require the document to be at `version`.
    pub fn at_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Additionally require the document to be owned by `owner`.
    pub fn owned_by(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Evaluate the predicate against a document.
    pub fn matches(&self, sow: &Sow) -> bool {
        sow.id == self.id
            && self.version.is_none_or(|v| sow.version == v)
            && self.owner.is_none_or(|o| sow.client_id == o)
    }
}

/// The delta one accepted update writes onto the stored document.
///
/// Only the patched fields are written; everything else (in particular
/// comments appended since the update read the document) is kept.
#[derive(Debug, Clone)]
pub struct RevisionDelta {
    /// New values for the changed tracked fields.
    pub fields: Vec<SowField>,
    /// The revision recording the change. Its snapshot is retaken from the
    /// stored document when the delta is applied.
    pub revision: SowRevision,
    /// Set when the update moves the document into `pending`.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Set when the update moves the document into `approved`.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approval history entry written with a status change.
    pub approval_entry: Option<ApprovalComment>,
}

/// A mutation applied by [`SowCollection::find_one_and_update`].
#[derive(Debug, Clone)]
pub enum SowMutation {
    /// Apply a field delta, bump the version and append its revision.
    Revise(Box<RevisionDelta>),
    /// Append an approval comment and advance `updated_at` to the comment
    /// time (never backwards). Version and revision history are untouched.
    AppendComment(ApprovalComment),
}

impl SowMutation {
    /// Apply the mutation to a document the filter already matched.
    pub fn apply_to(self, current: &mut Sow) -> AppResult<()> {
        match self {
            Self::Revise(delta) => {
                let RevisionDelta {
                    fields,
                    mut revision,
                    submitted_at,
                    approved_at,
                    approval_entry,
                } = *delta;
                if revision.version != current.version + 1 {
                    return Err(AppError::internal(format!(
                        "Revision {} cannot follow version {} of SOW {}",
                        revision.version, current.version, current.id
                    )));
                }

                revision.snapshot = current.snapshot();
                revision.timestamp = revision.timestamp.max(current.updated_at);
                for field in fields {
                    current.apply(field);
                }
                if submitted_at.is_some() {
                    current.submitted_at = submitted_at;
                }
                if approved_at.is_some() {
                    current.approved_at = approved_at;
                }
                if let Some(entry) = approval_entry {
                    current.approval_history.push(entry);
                }
                current.version = revision.version;
                current.updated_at = revision.timestamp;
                current.revision_history.push(revision);
            }
            Self::AppendComment(comment) => {
                current.updated_at = current.updated_at.max(comment.timestamp);
                current.approval_history.push(comment);
            }
        }
        Ok(())
    }
}

/// Listing query. Empty fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SowQuery {
    /// Only documents owned by this client.
    pub client_id: Option<UserId>,
    /// Only documents in this status.
    pub status: Option<SowStatus>,
}

impl SowQuery {
    /// Evaluate the query against a document.
    pub fn matches(&self, sow: &Sow) -> bool {
        self.client_id.is_none_or(|c| sow.client_id == c)
            && self.status.is_none_or(|s| sow.status == s)
    }
}

/// Generic document collection holding SOWs.
///
/// Conditional operations are atomic with respect to each other: the
/// predicate is evaluated and the mutation applied without any other writer
/// interleaving on the same document.
#[async_trait]
pub trait SowCollection: Send + Sync + 'static {
    /// Find a document by id.
    async fn find_one(&self, id: SowId) -> AppResult<Option<Sow>>;

    /// Insert a new document. Fails with `Conflict` if the id exists.
    async fn insert_one(&self, sow: &Sow) -> AppResult<()>;

    /// Apply `mutation` to the document matching `filter` and return the
    /// updated document, or `None` if nothing matched.
    async fn find_one_and_update(
        &self,
        filter: SowFilter,
        mutation: SowMutation,
    ) -> AppResult<Option<Sow>>;

    /// Delete the document matching `filter`. Returns the number deleted.
    async fn delete_one(&self, filter: SowFilter) -> AppResult<u64>;

    /// Stream documents matching `query`, newest creation first.
    ///
    /// Nothing is read until the stream is first polled.
    fn find(&self, query: SowQuery) -> BoxStream<'_, AppResult<Sow>>;
}
