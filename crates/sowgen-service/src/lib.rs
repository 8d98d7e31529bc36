//! # sowgen-service
//!
//! The SOW document lifecycle. [`DocumentStore`] owns the authoritative
//! document and routes every mutation through a single conditional write
//! on the backing [`SowCollection`](sowgen_database::SowCollection),
//! using [`RevisionEngine`] for the audit trail and
//! [`WorkflowStateMachine`] for status changes.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod sow;

pub use sow::{
    DocumentStore, RecentChange, RevisionEngine, RoleTransitionPolicy, SowStats, StatsService,
    TransitionPolicy, WorkflowStateMachine,
};
