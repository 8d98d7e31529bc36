//! Status transitions.
//!
//! Every status in [`SowStatus::ALL`] may be written; which actor may
//! request which move is decided by a pluggable [`TransitionPolicy`].

use std::fmt;
use std::sync::Arc;

use sowgen_auth::rbac::{SowAction, SowPolicies};
use sowgen_core::error::AppError;
use sowgen_entity::sow::SowStatus;
use sowgen_entity::user::UserRole;

/// Decides whether a role may move a document from one status to another.
pub trait TransitionPolicy: Send + Sync + fmt::Debug + 'static {
    /// Whether `role` may move a document from `from` to `to`.
    fn permits(&self, from: SowStatus, to: SowStatus, role: UserRole) -> bool;
}

/// Policy backed by the role × action table: the move is classified into a
/// [`SowAction`] and allowed if the role holds that action at any scope.
#[derive(Debug, Clone, Default)]
pub struct RoleTransitionPolicy {
    policies: SowPolicies,
}

impl RoleTransitionPolicy {
    /// Creates a policy over the given table.
    pub fn new(policies: SowPolicies) -> Self {
        Self { policies }
    }
}

impl TransitionPolicy for RoleTransitionPolicy {
    fn permits(&self, from: SowStatus, to: SowStatus, role: UserRole) -> bool {
        self.policies
            .scope_for(role, WorkflowStateMachine::classify(from, to))
            .is_some()
    }
}

/// Validates status changes against a [`TransitionPolicy`].
#[derive(Debug, Clone)]
pub struct WorkflowStateMachine {
    policy: Arc<dyn TransitionPolicy>,
}

impl WorkflowStateMachine {
    /// Creates a state machine using `policy`.
    pub fn new(policy: Arc<dyn TransitionPolicy>) -> Self {
        Self { policy }
    }

    /// The action a move from `from` to `to` amounts to.
    pub fn classify(from: SowStatus, to: SowStatus) -> SowAction {
        use SowStatus::*;
        match (from, to) {
            (Draft | ChangesRequested, Pending) => SowAction::Submit,
            (Pending | ChangesRequested, Draft) => SowAction::Withdraw,
            (Pending, Approved) => SowAction::Approve,
            (Pending, Rejected) => SowAction::Reject,
            (Pending, ChangesRequested) => SowAction::RequestChanges,
            _ => SowAction::Reopen,
        }
    }

    /// Check a requested move, returning the action it was classified as.
    pub fn check(
        &self,
        from: SowStatus,
        to: SowStatus,
        role: UserRole,
    ) -> Result<SowAction, AppError> {
        let action = Self::classify(from, to);
        if self.policy.permits(from, to, role) {
            Ok(action)
        } else {
            Err(AppError::invalid_transition(format!(
                "Role '{role}' may not move a SOW from '{from}' to '{to}'"
            )))
        }
    }
}

impl Default for WorkflowStateMachine {
    fn default() -> Self {
        Self::new(Arc::new(RoleTransitionPolicy::default()))
    }
}
