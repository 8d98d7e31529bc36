//! SOW entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sowgen_core::types::{SowId, UserId};

use super::field::{SowField, SowFieldName};
use super::status::SowStatus;
use crate::comment::ApprovalComment;
use crate::revision::SowRevision;

/// A Statement of Work moving through the approval workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sow {
    /// Unique document identifier, immutable after creation.
    pub id: SowId,
    /// Project title.
    pub project_name: String,
    /// Long-form project description.
    pub project_description: Option<String>,
    /// The owning client.
    pub client_id: UserId,
    /// Display name of the owning client.
    pub client_name: Option<String>,
    /// Client organization.
    pub client_organization: Option<String>,
    /// Workflow status.
    pub status: SowStatus,
    /// Free-form structured payload (migration stages, trainings, ...).
    #[serde(default)]
    pub data: Map<String, Value>,
    /// The approver currently responsible for the document.
    pub current_approver_id: Option<UserId>,
    /// Estimated commercial value.
    pub estimated_value: Option<f64>,
    /// Estimated duration in weeks.
    pub estimated_duration_weeks: Option<u32>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last touched (update or comment).
    pub updated_at: DateTime<Utc>,
    /// When the document last entered `pending`.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the document last entered `approved`.
    pub approved_at: Option<DateTime<Utc>>,
    /// Version counter, starting at 1.
    pub version: u64,
    /// Append-only revision history; `len == version - 1`.
    #[serde(default)]
    pub revision_history: Vec<SowRevision>,
    /// Append-only approval and comment history.
    #[serde(default)]
    pub approval_history: Vec<ApprovalComment>,
}

impl Sow {
    /// Build a fresh draft at version 1 with empty histories.
    pub fn create(input: CreateSow, client_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: SowId::new(),
            project_name: input.project_name,
            project_description: input.project_description,
            client_id,
            client_name: input.client_name,
            client_organization: input.client_organization,
            status: SowStatus::Draft,
            data: input.data,
            current_approver_id: input.current_approver_id,
            estimated_value: input.estimated_value,
            estimated_duration_weeks: input.estimated_duration_weeks,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            approved_at: None,
            version: 1,
            revision_history: Vec::new(),
            approval_history: Vec::new(),
        }
    }

    /// Whether `user` owns this document.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.client_id == *user
    }

    /// Current value of a tracked field as JSON.
    pub fn field_value(&self, name: SowFieldName) -> Value {
        self.field(name).to_value()
    }

    /// Current value of a tracked field.
    pub fn field(&self, name: SowFieldName) -> SowField {
        match name {
            SowFieldName::ProjectName => SowField::ProjectName(self.project_name.clone()),
            SowFieldName::ProjectDescription => {
                SowField::ProjectDescription(self.project_description.clone())
            }
            SowFieldName::ClientName => SowField::ClientName(self.client_name.clone()),
            SowFieldName::ClientOrganization => {
                SowField::ClientOrganization(self.client_organization.clone())
            }
            SowFieldName::Status => SowField::Status(self.status),
            SowFieldName::Data => SowField::Data(self.data.clone()),
            SowFieldName::CurrentApproverId => {
                SowField::CurrentApproverId(self.current_approver_id)
            }
            SowFieldName::EstimatedValue => SowField::EstimatedValue(self.estimated_value),
            SowFieldName::EstimatedDurationWeeks => {
                SowField::EstimatedDurationWeeks(self.estimated_duration_weeks)
            }
        }
    }

    /// Write a tracked field. Bookkeeping is left to the caller.
    pub fn apply(&mut self, field: SowField) {
        match field {
            SowField::ProjectName(v) => self.project_name = v,
            SowField::ProjectDescription(v) => self.project_description = v,
            SowField::ClientName(v) => self.client_name = v,
            SowField::ClientOrganization(v) => self.client_organization = v,
            SowField::Status(v) => self.status = v,
            SowField::Data(v) => self.data = v,
            SowField::CurrentApproverId(v) => self.current_approver_id = v,
            SowField::EstimatedValue(v) => self.estimated_value = v,
            SowField::EstimatedDurationWeeks(v) => self.estimated_duration_weeks = v,
        }
    }

    /// All tracked fields keyed by wire name.
    pub fn tracked_state(&self) -> Map<String, Value> {
        SowFieldName::ALL
            .iter()
            .map(|name| (name.as_str().to_string(), self.field_value(*name)))
            .collect()
    }

    /// Copy of the current state without the revision history.
    pub fn snapshot(&self) -> SowSnapshot {
        SowSnapshot {
            id: self.id,
            project_name: self.project_name.clone(),
            project_description: self.project_description.clone(),
            client_id: self.client_id,
            client_name: self.client_name.clone(),
            client_organization: self.client_organization.clone(),
            status: self.status,
            data: self.data.clone(),
            current_approver_id: self.current_approver_id,
            estimated_value: self.estimated_value,
            estimated_duration_weeks: self.estimated_duration_weeks,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            version: self.version,
            approval_history: self.approval_history.clone(),
        }
    }
}

/// Pre-update state captured inside a revision.
///
/// Mirrors [`Sow`] minus `revision_history`, so revisions never nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SowSnapshot {
    /// Document identifier.
    pub id: SowId,
    /// Project title.
    pub project_name: String,
    /// Long-form project description.
    pub project_description: Option<String>,
    /// The owning client.
    pub client_id: UserId,
    /// Display name of the owning client.
    pub client_name: Option<String>,
    /// Client organization.
    pub client_organization: Option<String>,
    /// Workflow status.
    pub status: SowStatus,
    /// Free-form structured payload.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// The approver responsible at the time.
    pub current_approver_id: Option<UserId>,
    /// Estimated commercial value.
    pub estimated_value: Option<f64>,
    /// Estimated duration in weeks.
    pub estimated_duration_weeks: Option<u32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last touch time.
    pub updated_at: DateTime<Utc>,
    /// Last submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Last approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Version the document had.
    pub version: u64,
    /// Comments present at the time.
    #[serde(default)]
    pub approval_history: Vec<ApprovalComment>,
}

impl SowSnapshot {
    /// Rebuild a document from this snapshot, with an empty revision history.
    pub fn restore(&self) -> Sow {
        Sow {
            id: self.id,
            project_name: self.project_name.clone(),
            project_description: self.project_description.clone(),
            client_id: self.client_id,
            client_name: self.client_name.clone(),
            client_organization: self.client_organization.clone(),
            status: self.status,
            data: self.data.clone(),
            current_approver_id: self.current_approver_id,
            estimated_value: self.estimated_value,
            estimated_duration_weeks: self.estimated_duration_weeks,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            version: self.version,
            revision_history: Vec::new(),
            approval_history: self.approval_history.clone(),
        }
    }

    /// All tracked fields keyed by wire name.
    pub fn tracked_state(&self) -> Map<String, Value> {
        self.restore().tracked_state()
    }
}

/// Data required to create a new SOW.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSow {
    /// Project title (required, non-empty).
    pub project_name: String,
    /// Long-form description.
    #[serde(default)]
    pub project_description: Option<String>,
    /// Owner identity as received at the edge; must parse as a user id.
    pub client_id: String,
    /// Display name of the owner.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Client organization.
    #[serde(default)]
    pub client_organization: Option<String>,
    /// Initial payload.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Initially assigned approver.
    #[serde(default)]
    pub current_approver_id: Option<UserId>,
    /// Estimated commercial value.
    #[serde(default)]
    pub estimated_value: Option<f64>,
    /// Estimated duration in weeks.
    #[serde(default)]
    pub estimated_duration_weeks: Option<u32>,
}

impl CreateSow {
    /// Minimal input with a project name and owner.
    pub fn new(project_name: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_description: None,
            client_id: client_id.into(),
            client_name: None,
            client_organization: None,
            data: Map::new(),
            current_approver_id: None,
            estimated_value: None,
            estimated_duration_weeks: None,
        }
    }
}
