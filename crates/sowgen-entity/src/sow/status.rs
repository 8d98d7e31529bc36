//! SOW workflow status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a SOW in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SowStatus {
    /// Being written by the client; not yet visible to approvers.
    #[default]
    Draft,
    /// Submitted and awaiting an approver decision.
    Pending,
    /// Accepted by an approver.
    Approved,
    /// Declined by an approver.
    Rejected,
    /// Sent back to the client for edits.
    ChangesRequested,
}

impl SowStatus {
    /// Every status, in workflow order.
    pub const ALL: [SowStatus; 5] = [
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::ChangesRequested,
    ];

    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ChangesRequested => "changes-requested",
        }
    }

    /// Whether an approver has reached a final decision.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for SowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SowStatus {
    type Err = sowgen_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "changes-requested" => Ok(Self::ChangesRequested),
            _ => Err(sowgen_core::AppError::validation(format!(
                "Invalid SOW status: '{s}'. Expected one of: \
                 draft, pending, approved, rejected, changes-requested"
            ))),
        }
    }
}
