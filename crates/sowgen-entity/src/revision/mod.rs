//! Revision history entities.

pub mod model;

pub use model::{FieldChange, SowRevision};
