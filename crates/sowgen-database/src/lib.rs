//! # sowgen-database
//!
//! The persistence collaborator of the document lifecycle. [`SowCollection`]
//! is a generic document-collection contract (find / insert / conditional
//! update / conditional delete / ordered query); every conditional operation
//! takes its predicate and its mutation together so that a check and the
//! write it guards are one storage call.
//!
//! Two implementations are provided: [`MemoryCollection`] for single-node
//! use and tests, and [`PgSowCollection`] backed by PostgreSQL JSONB.

pub mod collection;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use collection::{RevisionDelta, SowCollection, SowFilter, SowMutation, SowQuery};
pub use connection::DatabasePool;
pub use memory::MemoryCollection;
pub use repositories::PgSowCollection;
