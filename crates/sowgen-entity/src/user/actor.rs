//! The authenticated principal performing an operation.

use serde::{Deserialize, Serialize};

use sowgen_core::types::UserId;

use super::role::UserRole;

/// Who is acting, as resolved by the (excluded) token verifier.
///
/// Passed into every mutating store operation so revisions and comments
/// can record the actor and the authorization table can be consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user's id.
    pub id: UserId,
    /// Display name recorded in revisions and comments.
    pub name: String,
    /// The user's role.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(id: UserId, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}
