//! Role × action decision table.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use sowgen_entity::user::UserRole;

/// An operation an actor can attempt on a SOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SowAction {
    /// Create a new document.
    Create,
    /// Read a document or its history.
    Read,
    /// Change non-status fields.
    Edit,
    /// Move a draft (or returned document) into review.
    Submit,
    /// Pull a document back out of review into draft.
    Withdraw,
    /// Accept a pending document.
    Approve,
    /// Reject a pending document.
    Reject,
    /// Return a pending document to the client for changes.
    RequestChanges,
    /// Any other status change, such as reopening a decided document.
    Reopen,
    /// Append to the approval history.
    Comment,
    /// Hard-delete a document.
    Delete,
}

impl SowAction {
    /// Every action.
    pub const ALL: [SowAction; 11] = [
        Self::Create,
        Self::Read,
        Self::Edit,
        Self::Submit,
        Self::Withdraw,
        Self::Approve,
        Self::Reject,
        Self::RequestChanges,
        Self::Reopen,
        Self::Comment,
        Self::Delete,
    ];
}

impl fmt::Display for SowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Edit => "edit",
            Self::Submit => "submit",
            Self::Withdraw => "withdraw",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestChanges => "request_changes",
            Self::Reopen => "reopen",
            Self::Comment => "comment",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// How far a grant reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only documents whose `client_id` is the actor.
    Own,
    /// Every document.
    Any,
}

/// Defines, for each role, which actions it may perform and on which
/// documents.
#[derive(Debug, Clone)]
pub struct SowPolicies {
    /// Role → action → scope. A missing action is a denial.
    grants: HashMap<UserRole, HashMap<SowAction, Scope>>,
}

impl SowPolicies {
    /// Creates the default table.
    ///
    /// Clients manage their own documents up to submission. Approvers
    /// decide pending documents. Admins may do anything to any document.
    pub fn new() -> Self {
        let mut grants = HashMap::new();

        let client = [
            SowAction::Create,
            SowAction::Read,
            SowAction::Edit,
            SowAction::Submit,
            SowAction::Withdraw,
            SowAction::Comment,
            SowAction::Delete,
        ]
        .into_iter()
        .map(|a| (a, Scope::Own))
        .collect();
        grants.insert(UserRole::Client, client);

        let approver = [
            SowAction::Read,
            SowAction::Approve,
            SowAction::Reject,
            SowAction::RequestChanges,
            SowAction::Comment,
        ]
        .into_iter()
        .map(|a| (a, Scope::Any))
        .collect();
        grants.insert(UserRole::Approver, approver);

        let admin = SowAction::ALL.into_iter().map(|a| (a, Scope::Any)).collect();
        grants.insert(UserRole::Admin, admin);

        Self { grants }
    }

    /// An empty table that denies everything.
    pub fn deny_all() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Grant `action` to `role` with the given scope, replacing any earlier
    /// grant.
    pub fn grant(mut self, role: UserRole, action: SowAction, scope: Scope) -> Self {
        self.grants.entry(role).or_default().insert(action, scope);
        self
    }

    /// Remove a grant.
    pub fn revoke(mut self, role: UserRole, action: SowAction) -> Self {
        if let Some(actions) = self.grants.get_mut(&role) {
            actions.remove(&action);
        }
        self
    }

    /// The scope `role` holds for `action`, `None` if denied.
    pub fn scope_for(&self, role: UserRole, action: SowAction) -> Option<Scope> {
        self.grants.get(&role).and_then(|a| a.get(&action)).copied()
    }
}

impl Default for SowPolicies {
    fn default() -> Self {
        Self::new()
    }
}
