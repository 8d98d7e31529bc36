//! User-facing identity types.

pub mod actor;
pub mod role;

pub use actor::Actor;
pub use role::UserRole;
