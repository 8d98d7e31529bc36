//! Sliding-window rate limiter keyed by client identity.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use sowgen_core::config::RateLimitConfig;
use sowgen_core::traits::Clock;

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Admissions left in the current window after this one.
    pub remaining: u32,
}

/// Admits at most `max_requests` per identifier within any trailing
/// `window`.
///
/// Each identifier's timestamps live in their own map entry. Calls for the
/// same identifier are serialized by the entry lock; calls for different
/// identifiers only contend when they hash to the same shard.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, VecDeque<Instant>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
            clock,
        }
    }

    /// Creates a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.max_requests, config.window(), clock)
    }

    /// Check and, if allowed, record one request for `identifier`.
    ///
    /// A denied attempt is not recorded.
    pub fn admit(&self, identifier: &str) -> Admission {
        let now = self.clock.now();
        let mut entry = self.windows.entry(identifier.to_string()).or_default();
        prune(&mut entry, now, self.window);

        let used = u32::try_from(entry.len()).unwrap_or(u32::MAX);
        if used >= self.max_requests {
            warn!(identifier = %identifier, used, "Rate limit exceeded");
            return Admission {
                allowed: false,
                remaining: 0,
            };
        }

        entry.push_back(now);
        let remaining = self.max_requests - used - 1;
        debug!(identifier = %identifier, remaining, "Request admitted");
        Admission {
            allowed: true,
            remaining,
        }
    }

    /// Drop identifiers with no timestamps left in the window.
    ///
    /// Returns the number of identifiers removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    /// Configured admissions per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Remove timestamps older than `now - window`.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while timestamps
        .front()
        .is_some_and(|t| now.saturating_duration_since(*t) > window)
    {
        timestamps.pop_front();
    }
}
