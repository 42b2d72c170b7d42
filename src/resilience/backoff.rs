//! Delays between retries of throttled reads.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Delay before retry number `attempt` (0 is the first try and never waits).
///
/// Doubles from `base_delay_ms` per retry up to `max_delay_ms`, then adds up
/// to a tenth of that as jitter so throttled callers do not retry in lockstep.
pub fn retry_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let Some(retries) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let factor = 1u64.checked_shl(retries).unwrap_or(u64::MAX);
    let delay_ms = retry
        .base_delay_ms
        .saturating_mul(factor)
        .min(retry.max_delay_ms);
    let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms / 10);

    Duration::from_millis(delay_ms.saturating_add(jitter_ms))
}
