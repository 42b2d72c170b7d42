//! The single entry point for contract reads.
//!
//! ```text
//! view(contract, method, args, ttl)
//!     → ResultCache   live entry → return (no limiter, no network)
//!     → RateLimiter   denied     → ViewResult::Throttled (not cached)
//!     → ViewSource    wallet, then RPC
//!     → ResultCache   store values only
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::client::RpcClient;
use crate::blockchain::dispatcher::{QueryDispatcher, ViewSource};
use crate::blockchain::types::{BlockchainError, BlockchainResult, CallSignature, ViewResult};
use crate::blockchain::wallet::WalletSelector;
use crate::config::{BadgeConfig, RetryConfig};
use crate::resilience::backoff::retry_delay;
use crate::resilience::{RateLimiter, ResultCache};

/// Cached, rate-limited view calls. Share one instance between all readers.
pub struct ReadPipeline {
    source: Arc<dyn ViewSource>,
    limiter: Arc<RateLimiter>,
    cache: ResultCache,
    retry: RetryConfig,
}

impl ReadPipeline {
    pub fn new(source: Arc<dyn ViewSource>, limiter: Arc<RateLimiter>, cache: ResultCache) -> Self {
        Self {
            source,
            limiter,
            cache,
            retry: RetryConfig::default(),
        }
    }

    /// Backoff used by [`view_with_retry`](Self::view_with_retry).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Wire the RPC client, dispatcher, limiter and cache from configuration.
    pub fn from_config(config: &BadgeConfig) -> BlockchainResult<Self> {
        let dispatcher = QueryDispatcher::new(RpcClient::new(&config.network)?);
        let pipeline = Self::new(
            Arc::new(dispatcher),
            Arc::new(RateLimiter::from_config(&config.rate_limit)),
            ResultCache::from_config(&config.cache),
        )
        .with_retry(config.retries.clone());

        tracing::info!(
            max_per_window = config.rate_limit.max_per_window,
            window_secs = config.rate_limit.window_secs,
            dedup_in_flight = config.cache.dedup_in_flight,
            "Read pipeline ready"
        );
        Ok(pipeline)
    }

    /// Run a view call through cache, limiter and dispatcher.
    pub async fn view(
        &self,
        wallet: Option<Arc<dyn WalletSelector>>,
        contract_id: &str,
        method: &str,
        args: Value,
        ttl: Duration,
    ) -> BlockchainResult<ViewResult<Value>> {
        let signature = CallSignature::new(contract_id, method, &args);
        let source = Arc::clone(&self.source);
        let limiter = Arc::clone(&self.limiter);
        let contract_id = contract_id.to_string();
        let method = method.to_string();

        self.cache
            .get_or_fetch(signature, ttl, move || async move {
                if !limiter.admit() {
                    return Ok(ViewResult::Throttled);
                }
                source
                    .query(wallet.as_deref(), &contract_id, &method, &args)
                    .await
                    .map(ViewResult::from)
            })
            .await
    }

    /// [`view`](Self::view), deserializing the value into `T`.
    pub async fn view_as<T: DeserializeOwned>(
        &self,
        wallet: Option<Arc<dyn WalletSelector>>,
        contract_id: &str,
        method: &str,
        args: Value,
        ttl: Duration,
    ) -> BlockchainResult<ViewResult<T>> {
        match self.view(wallet, contract_id, method, args, ttl).await? {
            ViewResult::Value(value) => serde_json::from_value(value)
                .map(ViewResult::Value)
                .map_err(|e| BlockchainError::Decode(format!("{}: {}", method, e))),
            ViewResult::Empty => Ok(ViewResult::Empty),
            ViewResult::Throttled => Ok(ViewResult::Throttled),
        }
    }

    /// [`view`](Self::view), retrying throttled calls with exponential backoff.
    ///
    /// Errors and empty answers are returned at once. After the last attempt a
    /// still-throttled call is reported as `Throttled`.
    pub async fn view_with_retry(
        &self,
        wallet: Option<Arc<dyn WalletSelector>>,
        contract_id: &str,
        method: &str,
        args: Value,
        ttl: Duration,
    ) -> BlockchainResult<ViewResult<Value>> {
        let attempts = self.retry.max_attempts.max(1);
        for attempt in 0..attempts {
            let delay = retry_delay(&self.retry, attempt);
            if !delay.is_zero() {
                tracing::debug!(method = method, attempt, delay_ms = delay.as_millis() as u64, "Retrying throttled read");
                tokio::time::sleep(delay).await;
            }

            let result = self
                .view(wallet.clone(), contract_id, method, args.clone(), ttl)
                .await?;
            if !result.is_throttled() {
                return Ok(result);
            }
        }
        Ok(ViewResult::Throttled)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl std::fmt::Debug for ReadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadPipeline")
            .field("limiter", &self.limiter)
            .field("cache", &self.cache)
            .finish()
    }
}
