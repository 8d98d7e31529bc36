//! Tracked SOW fields and their typed values.
//!
//! Only the fields listed in [`SowFieldName`] participate in patches and
//! revision diffs. Bookkeeping (`id`, `version`, timestamps, histories) is
//! never patchable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use sowgen_core::AppError;
use sowgen_core::types::UserId;

use super::status::SowStatus;

/// Name of a tracked, patchable SOW field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SowFieldName {
    /// Project title.
    ProjectName,
    /// Long-form project description.
    ProjectDescription,
    /// Display name of the owning client.
    ClientName,
    /// Client organization.
    ClientOrganization,
    /// Workflow status.
    Status,
    /// Free-form structured payload.
    Data,
    /// The approver currently responsible for the document.
    CurrentApproverId,
    /// Estimated commercial value.
    EstimatedValue,
    /// Estimated duration in weeks.
    EstimatedDurationWeeks,
}

impl SowFieldName {
    /// Every tracked field.
    pub const ALL: [SowFieldName; 9] = [
        Self::ProjectName,
        Self::ProjectDescription,
        Self::ClientName,
        Self::ClientOrganization,
        Self::Status,
        Self::Data,
        Self::CurrentApproverId,
        Self::EstimatedValue,
        Self::EstimatedDurationWeeks,
    ];

    /// Wire (camelCase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectName => "projectName",
            Self::ProjectDescription => "projectDescription",
            Self::ClientName => "clientName",
            Self::ClientOrganization => "clientOrganization",
            Self::Status => "status",
            Self::Data => "data",
            Self::CurrentApproverId => "currentApproverId",
            Self::EstimatedValue => "estimatedValue",
            Self::EstimatedDurationWeeks => "estimatedDurationWeeks",
        }
    }

    /// Human-readable label used in revision summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProjectName => "Project Name",
            Self::ProjectDescription => "Project Description",
            Self::ClientName => "Client Name",
            Self::ClientOrganization => "Client Organization",
            Self::Status => "Status",
            Self::Data => "Project Data",
            Self::CurrentApproverId => "Current Approver",
            Self::EstimatedValue => "Estimated Value",
            Self::EstimatedDurationWeeks => "Estimated Duration",
        }
    }

    /// Resolve an input key, accepting camelCase or snake_case.
    ///
    /// Returns `None` for bookkeeping and unknown keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "projectName" | "project_name" => Some(Self::ProjectName),
            "projectDescription" | "project_description" => Some(Self::ProjectDescription),
            "clientName" | "client_name" => Some(Self::ClientName),
            "clientOrganization" | "client_organization" => Some(Self::ClientOrganization),
            "status" => Some(Self::Status),
            "data" => Some(Self::Data),
            "currentApproverId" | "current_approver_id" => Some(Self::CurrentApproverId),
            "estimatedValue" | "estimated_value" => Some(Self::EstimatedValue),
            "estimatedDurationWeeks" | "estimated_duration_weeks" => {
                Some(Self::EstimatedDurationWeeks)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SowFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked field together with its new value.
///
/// `None` on an optional field is an explicit "clear" request.
#[derive(Debug, Clone, PartialEq)]
pub enum SowField {
    /// New project title.
    ProjectName(String),
    /// New description.
    ProjectDescription(Option<String>),
    /// New client display name.
    ClientName(Option<String>),
    /// New client organization.
    ClientOrganization(Option<String>),
    /// Requested workflow status.
    Status(SowStatus),
    /// Replacement payload.
    Data(Map<String, Value>),
    /// New current approver.
    CurrentApproverId(Option<UserId>),
    /// New estimated value.
    EstimatedValue(Option<f64>),
    /// New estimated duration in weeks.
    EstimatedDurationWeeks(Option<u32>),
}

impl SowField {
    /// The name of the field this value targets.
    pub fn name(&self) -> SowFieldName {
        match self {
            Self::ProjectName(_) => SowFieldName::ProjectName,
            Self::ProjectDescription(_) => SowFieldName::ProjectDescription,
            Self::ClientName(_) => SowFieldName::ClientName,
            Self::ClientOrganization(_) => SowFieldName::ClientOrganization,
            Self::Status(_) => SowFieldName::Status,
            Self::Data(_) => SowFieldName::Data,
            Self::CurrentApproverId(_) => SowFieldName::CurrentApproverId,
            Self::EstimatedValue(_) => SowFieldName::EstimatedValue,
            Self::EstimatedDurationWeeks(_) => SowFieldName::EstimatedDurationWeeks,
        }
    }

    /// The value as JSON, for diffing and revision records.
    pub fn to_value(&self) -> Value {
        match self {
            Self::ProjectName(v) => Value::from(v.as_str()),
            Self::ProjectDescription(v) | Self::ClientName(v) | Self::ClientOrganization(v) => {
                v.as_deref().map(Value::from).unwrap_or(Value::Null)
            }
            Self::Status(v) => Value::from(v.as_str()),
            Self::Data(v) => Value::Object(v.clone()),
            Self::CurrentApproverId(v) => v
                .map(|id| Value::from(id.to_string()))
                .unwrap_or(Value::Null),
            Self::EstimatedValue(v) => v.map(Value::from).unwrap_or(Value::Null),
            Self::EstimatedDurationWeeks(v) => v.map(Value::from).unwrap_or(Value::Null),
        }
    }

    /// Decode a JSON value for the named field.
    pub fn decode(name: SowFieldName, value: Value) -> Result<Self, AppError> {
        let invalid = |expected: &str| {
            AppError::validation(format!("Field '{name}' must be {expected}"))
        };

        let field = match name {
            SowFieldName::ProjectName => match value {
                Value::String(s) if !s.trim().is_empty() => Self::ProjectName(s),
                _ => return Err(invalid("a non-empty string")),
            },
            SowFieldName::ProjectDescription => Self::ProjectDescription(
                optional_string(value).ok_or_else(|| invalid("a string or null"))?,
            ),
            SowFieldName::ClientName => {
                Self::ClientName(optional_string(value).ok_or_else(|| invalid("a string or null"))?)
            }
            SowFieldName::ClientOrganization => Self::ClientOrganization(
                optional_string(value).ok_or_else(|| invalid("a string or null"))?,
            ),
            SowFieldName::Status => match value {
                Value::String(s) => Self::Status(s.parse()?),
                _ => return Err(invalid("a status string")),
            },
            SowFieldName::Data => match value {
                Value::Object(map) => Self::Data(map),
                _ => return Err(invalid("an object")),
            },
            SowFieldName::CurrentApproverId => match value {
                Value::Null => Self::CurrentApproverId(None),
                Value::String(s) => Self::CurrentApproverId(Some(
                    s.parse().map_err(|_| invalid("a user id or null"))?,
                )),
                _ => return Err(invalid("a user id or null")),
            },
            SowFieldName::EstimatedValue => match value {
                Value::Null => Self::EstimatedValue(None),
                Value::Number(n) => Self::EstimatedValue(Some(
                    n.as_f64().ok_or_else(|| invalid("a number or null"))?,
                )),
                _ => return Err(invalid("a number or null")),
            },
            SowFieldName::EstimatedDurationWeeks => match value {
                Value::Null => Self::EstimatedDurationWeeks(None),
                Value::Number(n) => Self::EstimatedDurationWeeks(Some(
                    n.as_u64()
                        .and_then(|w| u32::try_from(w).ok())
                        .ok_or_else(|| invalid("a whole number of weeks or null"))?,
                )),
                _ => return Err(invalid("a whole number of weeks or null")),
            },
        };

        Ok(field)
    }
}

fn optional_string(value: Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s)),
        _ => None,
    }
}
