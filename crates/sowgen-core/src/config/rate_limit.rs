//! Rate limiter configuration for the authentication entry point.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sliding-window admission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admissions per identifier inside one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Trailing window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// How often idle identifiers are swept, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl RateLimitConfig {
    /// The window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// The sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_max_requests() -> u32 {
    5
}

fn default_window() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}
