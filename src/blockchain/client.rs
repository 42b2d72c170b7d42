//! NEAR JSON-RPC client for contract view calls.
//!
//! # Responsibilities
//! - Build `query` / `call_function` requests at optimistic finality
//! - Enforce a per-request timeout
//! - Fail over to the next endpoint on transport failures
//! - Decode the returned byte payload into JSON or plain text

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::NetworkConfig;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'static str,
    params: CallFunctionParams<'a>,
}

#[derive(Debug, Serialize)]
struct CallFunctionParams<'a> {
    request_type: &'static str,
    finality: &'static str,
    account_id: &'a str,
    method_name: &'a str,
    args_base64: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<CallFunctionResult>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct CallFunctionResult {
    #[serde(default)]
    result: Option<Vec<u8>>,
    /// Older nodes report contract panics here instead of in `error`.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    logs: Vec<String>,
    #[serde(default)]
    block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    cause: Option<Value>,
}

impl JsonRpcError {
    /// Server-provided detail: `data` when present, else `message`.
    fn detail(&self) -> String {
        let data = match &self.data {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        data.or_else(|| self.message.clone())
            .or_else(|| self.cause.as_ref().map(Value::to_string))
            .unwrap_or_else(|| "unknown RPC error".to_string())
    }
}

/// Decode a view-call byte payload.
///
/// Empty payloads and JSON `null` yield `None`. Text that is not JSON is
/// returned as a string value rather than treated as an error.
pub fn decode_call_result(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(text.into_owned())),
    }
}

/// Endpoint as it may appear in logs: no query string, which can carry API keys.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

/// JSON-RPC client with failover support.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Url>,
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a client for the endpoints described by `config`.
    ///
    /// Invalid failover URLs are skipped with a warning; an invalid primary is an error.
    pub fn new(config: &NetworkConfig) -> BlockchainResult<Self> {
        let mut configured = config.rpc_endpoints().into_iter();
        let primary = configured.next().unwrap_or_default();
        let primary_url: Url = primary.parse().map_err(|e| {
            BlockchainError::Transport(format!("Invalid RPC URL '{}': {}", primary, e))
        })?;

        let mut endpoints = vec![primary_url];
        for url_str in configured {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self::with_endpoints(endpoints, Duration::from_secs(config.rpc_timeout_secs))?;
        tracing::info!(
            network = %config.network_id,
            rpc_url = %redacted(&client.endpoints[0]),
            failovers = client.endpoints.len() - 1,
            "RPC client initialized"
        );
        Ok(client)
    }

    /// Create a client for an explicit endpoint list.
    pub fn with_endpoints(endpoints: Vec<Url>, timeout_duration: Duration) -> BlockchainResult<Self> {
        if endpoints.is_empty() {
            return Err(BlockchainError::NotAvailable(
                "no RPC endpoints configured".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BlockchainError::Transport(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            http,
            endpoints,
            timeout_duration,
        })
    }

    /// Call a contract view method.
    ///
    /// JSON-RPC errors are returned at once: they come from the node and
    /// another node would answer the same. Only transport failures move on to
    /// the next endpoint.
    pub async fn call_function(
        &self,
        contract_id: &str,
        method: &str,
        args: &Value,
    ) -> BlockchainResult<Option<Value>> {
        let args_json = serde_json::to_vec(args)
            .map_err(|e| BlockchainError::Decode(format!("Unserializable args: {}", e)))?;
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method: "query",
            params: CallFunctionParams {
                request_type: "call_function",
                finality: "optimistic",
                account_id: contract_id,
                method_name: method,
                args_base64: BASE64.encode(args_json),
            },
        };

        let mut last_error = None;
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let started = Instant::now();
            let attempt = timeout(self.timeout_duration, self.post(endpoint, &request)).await;
            metrics::record_rpc_duration(started.elapsed());

            match attempt {
                Ok(Ok(response)) => {
                    tracing::debug!(
                        request_id = %request.id,
                        endpoint = %redacted(endpoint),
                        method = method,
                        "RPC response received"
                    );
                    return Self::into_value(response);
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next endpoint");
                    last_error = Some(e);
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next endpoint");
                    last_error = Some(BlockchainError::Timeout(self.timeout_duration.as_secs()));
                }
            }
        }

        Err(match last_error {
            Some(BlockchainError::Timeout(secs)) if self.endpoints.len() == 1 => {
                BlockchainError::Timeout(secs)
            }
            Some(e) => BlockchainError::Transport(format!("All RPC endpoints failed: {}", e)),
            None => BlockchainError::Transport("All RPC endpoints failed".to_string()),
        })
    }

    async fn post(
        &self,
        endpoint: &Url,
        request: &JsonRpcRequest<'_>,
    ) -> BlockchainResult<JsonRpcResponse> {
        let response = self
            .http
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| BlockchainError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BlockchainError::Transport(e.without_url().to_string()))?;

        // Nodes send JSON-RPC errors with non-2xx statuses too; prefer the body.
        serde_json::from_slice::<JsonRpcResponse>(&body).map_err(|e| {
            BlockchainError::Transport(format!("HTTP {} with unreadable body: {}", status, e))
        })
    }

    fn into_value(response: JsonRpcResponse) -> BlockchainResult<Option<Value>> {
        if let Some(error) = response.error {
            return Err(BlockchainError::Rpc(error.detail()));
        }

        let Some(result) = response.result else {
            return Ok(None);
        };

        if let Some(error) = result.error {
            return Err(BlockchainError::Rpc(error));
        }

        if !result.logs.is_empty() {
            tracing::debug!(logs = ?result.logs, block_height = ?result.block_height, "Contract logs");
        }

        Ok(result.result.as_deref().and_then(decode_call_result))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &redacted(&self.endpoints[0]))
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
