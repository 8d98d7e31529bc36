//! Decision-table enforcement for actors acting on documents.

use sowgen_core::error::AppError;
use sowgen_core::types::UserId;
use sowgen_entity::sow::Sow;
use sowgen_entity::user::{Actor, UserRole};

use super::policies::{Scope, SowAction, SowPolicies};

/// Evaluates the role × action table, including ownership scopes.
#[derive(Debug, Clone, Default)]
pub struct SowEnforcer {
    policies: SowPolicies,
}

impl SowEnforcer {
    /// Creates an enforcer with the default table.
    pub fn new() -> Self {
        Self {
            policies: SowPolicies::new(),
        }
    }

    /// Creates an enforcer with a custom table.
    pub fn with_policies(policies: SowPolicies) -> Self {
        Self { policies }
    }

    /// Whether `actor` may perform `action`.
    ///
    /// With no document, an `Own` grant is treated as satisfied; callers
    /// that act on an existing document must pass it.
    pub fn is_allowed(&self, actor: &Actor, action: SowAction, sow: Option<&Sow>) -> bool {
        match self.policies.scope_for(actor.role, action) {
            None => false,
            Some(Scope::Any) => true,
            Some(Scope::Own) => sow.is_none_or(|s| s.is_owned_by(&actor.id)),
        }
    }

    /// Like [`SowEnforcer::is_allowed`], but returns `Forbidden` on denial.
    pub fn require(
        &self,
        actor: &Actor,
        action: SowAction,
        sow: Option<&Sow>,
    ) -> Result<(), AppError> {
        if self.is_allowed(actor, action, sow) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{}' may not {action} this SOW",
                actor.role
            )))
        }
    }

    /// The owner a conditional write must require for `action`.
    ///
    /// `None` if the action is denied outright, `Some(None)` for an `Any`
    /// grant, and `Some(Some(actor))` for an `Own` grant.
    pub fn owner_predicate(&self, actor: &Actor, action: SowAction) -> Option<Option<UserId>> {
        match self.policies.scope_for(actor.role, action)? {
            Scope::Any => Some(None),
            Scope::Own => Some(Some(actor.id)),
        }
    }

    /// Whether the role may delete any document regardless of owner.
    pub fn is_privileged(&self, role: UserRole) -> bool {
        self.policies.scope_for(role, SowAction::Delete) == Some(Scope::Any)
    }

    /// The underlying table.
    pub fn policies(&self) -> &SowPolicies {
        &self.policies
    }
}
