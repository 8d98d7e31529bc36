//! Role-based access control for SOW operations.

pub mod enforcer;
pub mod policies;

pub use enforcer::SowEnforcer;
pub use policies::{Scope, SowAction, SowPolicies};
