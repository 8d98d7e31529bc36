//! # sowgen-auth
//!
//! Authorization and admission control for the SOW lifecycle.
//!
//! ## Modules
//!
//! - `rbac`: role × action decision table and its enforcer
//! - `rate_limit`: sliding-window login limiter and its idle sweeper
//! - `login`: rate-limited credential check in front of token issuance

pub mod login;
pub mod rate_limit;
pub mod rbac;

pub use login::LoginGuard;
pub use rate_limit::{Admission, LimiterSweeper, RateLimiter, spawn_sweeper};
pub use rbac::{Scope, SowAction, SowEnforcer, SowPolicies};
