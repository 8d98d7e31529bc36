//! Approval comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use sowgen_core::types::{CommentId, UserId};

use crate::sow::SowStatus;
use crate::user::Actor;

/// What an approval history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentAction {
    /// A plain comment with no status effect.
    Comment,
    /// The document was approved.
    Approved,
    /// The document was rejected.
    Rejected,
    /// Changes were requested from the client.
    ChangesRequested,
}

impl CommentAction {
    /// The tag recorded when a document enters `status`.
    pub fn for_status(status: SowStatus) -> Self {
        match status {
            SowStatus::Approved => Self::Approved,
            SowStatus::Rejected => Self::Rejected,
            SowStatus::ChangesRequested => Self::ChangesRequested,
            SowStatus::Draft | SowStatus::Pending => Self::Comment,
        }
    }

    /// Return the action as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ChangesRequested => "changes-requested",
        }
    }
}

impl fmt::Display for CommentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entry in a SOW's approval history. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalComment {
    /// Unique comment identifier.
    pub id: CommentId,
    /// The actor who wrote the entry.
    pub approver_id: UserId,
    /// Display name of the actor.
    pub approver_name: String,
    /// Free-text comment.
    pub comment: String,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// The action tag.
    pub action: CommentAction,
}

impl ApprovalComment {
    /// Create a new entry written by `actor`.
    pub fn new(
        actor: &Actor,
        comment: impl Into<String>,
        action: CommentAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new(),
            approver_id: actor.id,
            approver_name: actor.name.clone(),
            comment: comment.into(),
            timestamp,
            action,
        }
    }
}
