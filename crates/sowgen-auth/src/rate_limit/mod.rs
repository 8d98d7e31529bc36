//! Sliding-window admission control for the login entry point.

pub mod limiter;
pub mod sweeper;

pub use limiter::{Admission, RateLimiter};
pub use sweeper::{LimiterSweeper, spawn_sweeper};
