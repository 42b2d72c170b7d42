//! Time-boxed memoization of view results.
//!
//! Only real values are stored. Errors, empty answers and throttled calls go
//! straight back to the caller so the next call reaches the network again.
//! Entries are overwritten once expired and re-fetched; they are never evicted.

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::blockchain::types::{BlockchainError, BlockchainResult, CallSignature, ViewResult};
use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};

type FetchOutcome = BlockchainResult<ViewResult<Value>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expiry: Instant,
}

struct CacheInner {
    entries: DashMap<CallSignature, CacheEntry>,
    pending: Mutex<HashMap<CallSignature, SharedFetch>>,
    clock: Arc<dyn Clock>,
}

impl CacheInner {
    fn lookup(&self, signature: &CallSignature, now: Instant) -> Option<Value> {
        self.entries
            .get(signature)
            .filter(|entry| now < entry.expiry)
            .map(|entry| entry.value.clone())
    }

    fn store(&self, signature: &CallSignature, outcome: &FetchOutcome, expiry: Instant) {
        if let Ok(ViewResult::Value(value)) = outcome {
            self.entries.insert(
                signature.clone(),
                CacheEntry {
                    value: value.clone(),
                    expiry,
                },
            );
            metrics::record_cache_size(self.entries.len());
        }
    }

    fn unregister(&self, signature: &CallSignature) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(signature);
    }
}

/// Shared view-result cache. Cloning yields another handle to the same entries.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<CacheInner>,
    dedup_in_flight: bool,
}

impl ResultCache {
    pub fn new(clock: Arc<dyn Clock>, dedup_in_flight: bool) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                pending: Mutex::new(HashMap::new()),
                clock,
            }),
            dedup_in_flight,
        }
    }

    /// Build from configuration using the system clock.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Arc::new(SystemClock), config.dedup_in_flight)
    }

    /// Return the live entry for `signature`, or run `fetch` and remember a value.
    ///
    /// The expiry is measured from the moment of the call. With in-flight
    /// de-duplication on, the fetch runs as a spawned task and callers arriving
    /// while it runs wait for it instead of starting their own. Must be called
    /// from within a Tokio runtime.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        signature: CallSignature,
        ttl: Duration,
        fetch: F,
    ) -> FetchOutcome
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let now = self.inner.clock.now();
        if let Some(value) = self.inner.lookup(&signature, now) {
            tracing::debug!(method = %signature.method, "Cache hit");
            metrics::record_cache_lookup("hit");
            return Ok(ViewResult::Value(value));
        }

        let expiry = now.checked_add(ttl).unwrap_or(now);

        if !self.dedup_in_flight {
            tracing::debug!(method = %signature.method, "Cache miss");
            metrics::record_cache_lookup("miss");
            let outcome = fetch().await;
            self.inner.store(&signature, &outcome, expiry);
            return outcome;
        }

        let shared = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            // A leader may have stored and unregistered since the first lookup.
            if let Some(value) = self.inner.lookup(&signature, now) {
                tracing::debug!(method = %signature.method, "Cache hit");
                metrics::record_cache_lookup("hit");
                return Ok(ViewResult::Value(value));
            }

            match pending.get(&signature) {
                Some(in_flight) => {
                    tracing::debug!(method = %signature.method, "Joining in-flight read");
                    metrics::record_cache_lookup("joined");
                    in_flight.clone()
                }
                None => {
                    tracing::debug!(method = %signature.method, "Cache miss");
                    metrics::record_cache_lookup("miss");

                    let shared = self.spawn_fetch(signature.clone(), expiry, fetch());
                    pending.insert(signature, shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// Run `request` as its own task. The task stores the outcome and
    /// unregisters itself, so it finishes even when every waiter is dropped.
    fn spawn_fetch<Fut>(&self, key: CallSignature, expiry: Instant, request: Fut) -> SharedFetch
    where
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let outcome = request.await;
            inner.store(&task_key, &outcome, expiry);
            inner.unregister(&task_key);
            outcome
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The task never reached its own cleanup.
                    inner.unregister(&key);
                    tracing::error!(method = %key.method, error = %e, "View fetch task failed");
                    Err(BlockchainError::NotAvailable(format!("view fetch aborted: {}", e)))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Number of fetches currently shared between callers.
    pub fn in_flight(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.inner.entries.len())
            .field("dedup_in_flight", &self.dedup_in_flight)
            .finish()
    }
}
