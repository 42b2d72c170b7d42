//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the badge client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration for the badge client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BadgeConfig {
    /// Network, contract and RPC endpoint settings.
    pub network: NetworkConfig,

    /// Ceiling for outbound view calls.
    pub rate_limit: RateLimitConfig,

    /// View result caching.
    pub cache: CacheConfig,

    /// Backoff used when a caller opts into retrying throttled reads.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Environment variable overriding the network identifier.
pub const NETWORK_ID_ENV_VAR: &str = "NEAR_NETWORK_ID";
/// Environment variable overriding the badge contract account.
pub const CONTRACT_NAME_ENV_VAR: &str = "NEAR_CONTRACT_NAME";
/// Environment variable holding the FastNear API key.
pub const FASTNEAR_API_KEY_ENV_VAR: &str = "FASTNEAR_API_KEY";
/// Environment variable overriding the RPC endpoint.
pub const RPC_URL_ENV_VAR: &str = "NEAR_RPC_URL";

impl BadgeConfig {
    /// Apply `NEAR_*` / `FASTNEAR_API_KEY` environment overrides.
    ///
    /// Unparsable network identifiers are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(network) = std::env::var(NETWORK_ID_ENV_VAR) {
            match network.parse() {
                Ok(id) => self.network.network_id = id,
                Err(e) => tracing::warn!(value = %network, error = %e, "Ignoring {}", NETWORK_ID_ENV_VAR),
            }
        }
        if let Ok(contract) = std::env::var(CONTRACT_NAME_ENV_VAR) {
            self.network.contract_name = contract;
        }
        if let Ok(key) = std::env::var(FASTNEAR_API_KEY_ENV_VAR) {
            if !key.is_empty() {
                self.network.fastnear_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(RPC_URL_ENV_VAR) {
            if !url.is_empty() {
                self.network.rpc_url = Some(url);
            }
        }
    }
}

/// NEAR network identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    #[default]
    Testnet,
}

impl NetworkId {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkId::Mainnet),
            "testnet" => Ok(NetworkId::Testnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// Network and endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network the contract is deployed on.
    pub network_id: NetworkId,

    /// Account id of the badge contract.
    pub contract_name: String,

    /// Explicit JSON-RPC endpoint. Overrides the per-network default.
    pub rpc_url: Option<String>,

    /// FastNear API key. When set, the FastNear node for the network is used.
    pub fastnear_api_key: Option<String>,

    /// Endpoints tried in order when the primary is unreachable.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: NetworkId::Testnet,
            contract_name: "coba-admin.testnet".to_string(),
            rpc_url: None,
            fastnear_api_key: None,
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
        }
    }
}

impl NetworkConfig {
    /// Primary JSON-RPC endpoint for the configured network.
    pub fn rpc_endpoint(&self) -> String {
        if let Some(url) = &self.rpc_url {
            return url.clone();
        }
        match &self.fastnear_api_key {
            Some(key) => format!(
                "https://rpc.{}.fastnear.com/?apiKey={}",
                self.network_id, key
            ),
            None => format!("https://rpc.{}.near.org", self.network_id),
        }
    }

    /// Primary endpoint followed by the failover endpoints.
    pub fn rpc_endpoints(&self) -> Vec<String> {
        let mut endpoints = vec![self.rpc_endpoint()];
        endpoints.extend(self.failover_urls.iter().cloned());
        endpoints
    }

    /// Block explorer link for a submitted transaction.
    pub fn explorer_tx_url(&self, tx_id: &str) -> String {
        format!(
            "https://explorer.{}.near.org/transactions/{}",
            self.network_id, tx_id
        )
    }
}

/// Rate limiting configuration for view calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted calls per window.
    pub max_per_window: usize,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: 800,
            window_secs: 60,
        }
    }
}

/// View result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a call site does not choose one.
    pub default_ttl_secs: u64,

    /// Let concurrent identical reads share a single fetch.
    pub dedup_in_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 60,
            dedup_in_flight: true,
        }
    }
}

/// Retry configuration for throttled reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
