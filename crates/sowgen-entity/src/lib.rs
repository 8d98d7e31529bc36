//! # sowgen-entity
//!
//! Domain entity models for SOWgen. The [`sow::Sow`] document is the
//! aggregate root; revisions and approval comments only live inside it.
//! All entities derive `Debug`, `Clone`, `Serialize`, `Deserialize` and use
//! the camelCase wire names of the public API.

pub mod comment;
pub mod revision;
pub mod sow;
pub mod user;
