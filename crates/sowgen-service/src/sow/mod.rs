//! SOW lifecycle services.

pub mod revision;
pub mod stats;
pub mod store;
pub mod workflow;

pub use revision::RevisionEngine;
pub use stats::{SowStats, StatsService};
pub use store::{DocumentStore, RecentChange};
pub use workflow::{RoleTransitionPolicy, TransitionPolicy, WorkflowStateMachine};
