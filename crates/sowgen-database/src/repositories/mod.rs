//! PostgreSQL repository implementations.

pub mod sow;

pub use sow::PgSowCollection;
