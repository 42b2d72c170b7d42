//! Metrics collection.
//!
//! # Metrics
//! - `badge_view_cache_total` (counter): cache lookups by outcome (hit, miss, joined)
//! - `badge_view_cache_entries` (gauge): stored view results
//! - `badge_view_rate_limited_total` (counter): reads skipped by the rate limiter
//! - `badge_view_requests_total` (counter): network reads by path and outcome
//! - `badge_rpc_request_duration_seconds` (histogram): JSON-RPC latency
//! - `badge_transactions_total` (counter): submitted writes by method and outcome
//!
//! Only the `metrics` facade is used; the embedding application installs a
//! recorder if it wants the numbers exported.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a cache lookup outcome.
pub fn record_cache_lookup(outcome: &'static str) {
    counter!("badge_view_cache_total", "outcome" => outcome).increment(1);
}

/// Record the number of stored cache entries.
pub fn record_cache_size(entries: usize) {
    gauge!("badge_view_cache_entries").set(entries as f64);
}

/// Record a read skipped by the rate limiter.
pub fn record_rate_limited() {
    counter!("badge_view_rate_limited_total").increment(1);
}

/// Record a network read. `path` is `wallet` or `rpc`.
pub fn record_view_request(path: &'static str, outcome: &'static str) {
    counter!("badge_view_requests_total", "path" => path, "outcome" => outcome).increment(1);
}

/// Record JSON-RPC round-trip latency.
pub fn record_rpc_duration(duration: Duration) {
    histogram!("badge_rpc_request_duration_seconds").record(duration.as_secs_f64());
}

/// Record a submitted transaction.
pub fn record_transaction(method: &str, outcome: &'static str) {
    counter!(
        "badge_transactions_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
