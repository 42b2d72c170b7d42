//! Rolling-window rate limiter for outbound view calls.
//!
//! Keeps a log of admission instants. An entry leaves the window once its age
//! is strictly greater than the window length, so a call made exactly one
//! window after an admitted call still sees that call counted.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};

/// Admits at most `max_per_window` calls per rolling window.
pub struct RateLimiter {
    log: Mutex<VecDeque<std::time::Instant>>,
    max_per_window: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_per_window: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Mutex::new(VecDeque::with_capacity(max_per_window.min(1024))),
            max_per_window,
            window,
            clock,
        }
    }

    /// Build from configuration using the system clock.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_per_window,
            Duration::from_secs(config.window_secs),
            Arc::new(SystemClock),
        )
    }

    /// Try to admit one call.
    ///
    /// Pruning, the ceiling check and recording happen under a single lock.
    pub fn admit(&self) -> bool {
        let now = self.clock.now();
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);

        while let Some(&oldest) = log.front() {
            if now.saturating_duration_since(oldest) > self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.max_per_window {
            tracing::warn!(
                max_per_window = self.max_per_window,
                window_secs = self.window.as_secs(),
                "Rate limit exceeded; skipping call"
            );
            metrics::record_rate_limited();
            return false;
        }

        log.push_back(now);
        true
    }

    /// Calls currently counted against the window, without pruning.
    pub fn in_window(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn max_per_window(&self) -> usize {
        self.max_per_window
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_per_window", &self.max_per_window)
            .field("window", &self.window)
            .finish()
    }
}
