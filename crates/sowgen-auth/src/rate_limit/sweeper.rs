//! Periodic removal of idle limiter entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::limiter::RateLimiter;

/// Shortest accepted sweep interval.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Runs [`RateLimiter::sweep`] on a fixed interval.
#[derive(Debug)]
pub struct LimiterSweeper {
    limiter: Arc<RateLimiter>,
    interval: Duration,
}

impl LimiterSweeper {
    /// Create a sweeper. Intervals below 100ms are raised to 100ms.
    pub fn new(limiter: Arc<RateLimiter>, interval: Duration) -> Self {
        Self {
            limiter,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Sweep until `cancel` turns `true` or its sender is dropped.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Rate limiter sweeper started"
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = self.limiter.sweep();
                    debug!(removed, tracked = self.limiter.tracked(), "Rate limiter swept");
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Rate limiter sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Spawn a [`LimiterSweeper`] on the current runtime.
pub fn spawn_sweeper(
    limiter: Arc<RateLimiter>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let sweeper = LimiterSweeper::new(limiter, interval);
    tokio::spawn(async move { sweeper.run(shutdown).await })
}
