//! Statement of Work domain entities.

pub mod field;
pub mod model;
pub mod patch;
pub mod status;

pub use field::{SowField, SowFieldName};
pub use model::{CreateSow, Sow, SowSnapshot};
pub use patch::SowPatch;
pub use status::SowStatus;
