//! Approval comment entities.

pub mod model;

pub use model::{ApprovalComment, CommentAction};
