//! Resolution of a view call to the wallet or to a public RPC node.
//!
//! ```text
//! signed in + wallet can view?  ── yes ──▶ wallet.view_method ── ok ──▶ value
//!          │ no                                   │ error
//!          ▼                                      ▼
//!      RpcClient::call_function ◀─────────────────┘
//! ```
//!
//! The RPC path works regardless of sign-in state, so reads stay available for
//! visitors without a wallet.

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::client::RpcClient;
use crate::blockchain::types::BlockchainResult;
use crate::blockchain::wallet::{ViewRequest, WalletSelector};
use crate::observability::metrics;

/// Anything that can answer a contract view call.
///
/// `Ok(None)` means the method returned nothing.
#[async_trait]
pub trait ViewSource: Send + Sync {
    async fn query(
        &self,
        wallet: Option<&dyn WalletSelector>,
        contract_id: &str,
        method: &str,
        args: &Value,
    ) -> BlockchainResult<Option<Value>>;
}

/// Wallet-first, RPC-fallback dispatcher.
#[derive(Debug, Clone)]
pub struct QueryDispatcher {
    rpc: RpcClient,
}

impl QueryDispatcher {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Try the wallet. `Ok(None)` here means "not available, use RPC".
    async fn query_wallet(
        &self,
        selector: &dyn WalletSelector,
        contract_id: &str,
        method: &str,
        args: &Value,
    ) -> BlockchainResult<Option<Value>> {
        if !selector.is_signed_in() {
            return Ok(None);
        }

        let wallet = selector.wallet().await?;
        if !wallet.supports_view_method() {
            tracing::debug!(method = method, "Wallet has no view capability, using RPC");
            return Ok(None);
        }

        let request = ViewRequest {
            contract_id: contract_id.to_string(),
            method: method.to_string(),
            args: args.clone(),
        };
        tracing::debug!(method = method, "Using wallet view method");
        wallet.view_method(&request).await.map(Some)
    }
}

#[async_trait]
impl ViewSource for QueryDispatcher {
    async fn query(
        &self,
        wallet: Option<&dyn WalletSelector>,
        contract_id: &str,
        method: &str,
        args: &Value,
    ) -> BlockchainResult<Option<Value>> {
        if let Some(selector) = wallet {
            match self.query_wallet(selector, contract_id, method, args).await {
                Ok(Some(value)) => {
                    metrics::record_view_request("wallet", "success");
                    return Ok(match value {
                        Value::Null => None,
                        other => Some(other),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    metrics::record_view_request("wallet", "failure");
                    tracing::warn!(
                        method = method,
                        error = %e,
                        "Falling back to direct RPC call due to wallet view error"
                    );
                }
            }
        }

        tracing::debug!(contract = contract_id, method = method, "Using direct RPC node");
        match self.rpc.call_function(contract_id, method, args).await {
            Ok(value) => {
                metrics::record_view_request("rpc", "success");
                Ok(value)
            }
            Err(e) => {
                metrics::record_view_request("rpc", "failure");
                tracing::error!(method = method, error = %e, "RPC fallback failed");
                Err(e)
            }
        }
    }
}
