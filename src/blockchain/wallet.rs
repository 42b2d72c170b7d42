//! Wallet capabilities supplied by the embedding application.
//!
//! The crate never holds keys. Signing and wallet-side view queries are
//! delegated to a [`WalletSelector`], which hands out a [`WalletHandle`] for
//! the wallet the user picked.
//!
//! # Capability probing
//! Not every wallet can run view queries. Handles advertise that through
//! [`WalletHandle::supports_view_method`]; callers check it before using
//! [`WalletHandle::view_method`] and fall back to RPC otherwise.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::blockchain::transaction::{TransactionOutcome, TransactionRequest};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A view query routed through the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub contract_id: String,
    pub method: String,
    pub args: Value,
}

/// Entry point to the user's wallet(s).
#[async_trait]
pub trait WalletSelector: Send + Sync {
    /// Whether an account is currently signed in.
    fn is_signed_in(&self) -> bool;

    /// The active account, if any.
    fn active_account_id(&self) -> Option<String>;

    /// The selected wallet.
    async fn wallet(&self) -> BlockchainResult<Arc<dyn WalletHandle>>;

    /// Sign out of the selected wallet.
    async fn sign_out(&self) -> BlockchainResult<()> {
        let wallet = self.wallet().await?;
        wallet.sign_out().await?;
        tracing::info!("Signed out");
        Ok(())
    }
}

/// A concrete wallet.
#[async_trait]
pub trait WalletHandle: Send + Sync {
    /// Whether [`view_method`](Self::view_method) is implemented.
    fn supports_view_method(&self) -> bool {
        false
    }

    /// Run a view query through the wallet.
    async fn view_method(&self, request: &ViewRequest) -> BlockchainResult<Value> {
        Err(BlockchainError::NotAvailable(format!(
            "wallet cannot run view method '{}'",
            request.method
        )))
    }

    /// Sign and submit a transaction.
    async fn sign_and_send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> BlockchainResult<TransactionOutcome>;

    async fn sign_out(&self) -> BlockchainResult<()>;
}
