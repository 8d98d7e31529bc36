//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles recognised by the SOW authorization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// A customer who owns and edits their own SOWs.
    #[serde(rename = "client")]
    Client,
    /// Staff administrator with full access.
    #[serde(rename = "xebia-admin")]
    Admin,
    /// Staff member who reviews and decides pending SOWs.
    #[serde(rename = "approver")]
    Approver,
}

impl UserRole {
    /// Every role.
    pub const ALL: [UserRole; 3] = [Self::Client, Self::Admin, Self::Approver];

    /// Whether this role belongs to the service provider's staff.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Approver)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "xebia-admin",
            Self::Approver => "approver",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = sowgen_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "xebia-admin" | "admin" => Ok(Self::Admin),
            "approver" => Ok(Self::Approver),
            _ => Err(sowgen_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: client, xebia-admin, approver"
            ))),
        }
    }
}
