//! Revision entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sowgen_core::types::{RevisionId, UserId};

use crate::sow::{SowFieldName, SowSnapshot};

/// One tracked field that changed in an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// The field that changed.
    pub field: SowFieldName,
    /// Value before the update.
    pub old_value: Value,
    /// Value after the update.
    pub new_value: Value,
}

/// An immutable record of one update: who, when, what changed, and the
/// full state immediately before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SowRevision {
    /// Unique revision identifier.
    pub id: RevisionId,
    /// The version the document moved to with this revision.
    pub version: u64,
    /// When the update was committed.
    pub timestamp: DateTime<Utc>,
    /// The actor who made the change.
    pub changed_by: UserId,
    /// Display name of the actor.
    pub changed_by_name: String,
    /// Changed fields, in patch order.
    pub changes: Vec<FieldChange>,
    /// Human-readable summary, e.g. `"Updated Project Name, Status"`.
    pub summary: String,
    /// Document state before the update.
    pub snapshot: SowSnapshot,
}

impl SowRevision {
    /// Whether this revision touched the given field.
    pub fn touches(&self, field: SowFieldName) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }
}
