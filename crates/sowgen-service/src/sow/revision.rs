//! Field-level diffs and revision records.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use sowgen_core::error::AppError;
use sowgen_core::types::RevisionId;
use sowgen_entity::revision::{FieldChange, SowRevision};
use sowgen_entity::sow::{Sow, SowPatch, SowSnapshot};
use sowgen_entity::user::Actor;

/// Computes diffs between a document and a proposed patch and turns them
/// into immutable [`SowRevision`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionEngine;

impl RevisionEngine {
    /// Creates a new revision engine.
    pub fn new() -> Self {
        Self
    }

    /// Tracked fields whose value `patch` would change, in patch order.
    ///
    /// Values are compared by JSON equality, so setting a field to what it
    /// already holds is not a change.
    pub fn diff(&self, current: &Sow, patch: &SowPatch) -> Vec<FieldChange> {
        patch
            .fields()
            .filter_map(|field| {
                let old_value = current.field_value(field.name());
                let new_value = field.to_value();
                (old_value != new_value).then(|| FieldChange {
                    field: field.name(),
                    old_value,
                    new_value,
                })
            })
            .collect()
    }

    /// Build the revision recording `changes` made by `actor` to `before`.
    pub fn build_revision(
        &self,
        before: &Sow,
        changes: Vec<FieldChange>,
        actor: &Actor,
        timestamp: DateTime<Utc>,
    ) -> SowRevision {
        SowRevision {
            id: RevisionId::new(),
            version: before.version + 1,
            timestamp,
            changed_by: actor.id,
            changed_by_name: actor.name.clone(),
            summary: Self::summarize(&changes),
            changes,
            snapshot: before.snapshot(),
        }
    }

    /// Human-readable summary, e.g. `"Updated Project Name, Status"`.
    pub fn summarize(changes: &[FieldChange]) -> String {
        if changes.is_empty() {
            return "No changes".to_string();
        }
        let labels: Vec<&str> = changes.iter().map(|c| c.field.label()).collect();
        format!("Updated {}", labels.join(", "))
    }

    /// Reconstruct the tracked state before every revision and after the
    /// last one.
    ///
    /// The result has `revisions.len() + 1` entries; entry `i` is the state
    /// revision `i` was applied to. Fails if a revision's recorded old
    /// values do not match the replayed state.
    pub fn replay(
        &self,
        initial: &SowSnapshot,
        revisions: &[SowRevision],
    ) -> Result<Vec<Map<String, Value>>, AppError> {
        let mut state = initial.tracked_state();
        let mut states = Vec::with_capacity(revisions.len() + 1);

        for revision in revisions {
            for change in &revision.changes {
                let key = change.field.as_str();
                let current = state.get(key).unwrap_or(&Value::Null);
                if *current != change.old_value {
                    return Err(AppError::internal(format!(
                        "Revision history diverges at version {} on field '{key}'",
                        revision.version
                    )));
                }
            }
            states.push(state.clone());
            for change in &revision.changes {
                state.insert(change.field.as_str().to_string(), change.new_value.clone());
            }
        }

        states.push(state);
        Ok(states)
    }
}
