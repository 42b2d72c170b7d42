//! Transaction intents and submission through the wallet.
//!
//! # Responsibilities
//! - Describe function-call actions with their gas and deposit
//! - Hand them to the wallet for signing
//! - Read back the transaction id from either outcome shape
//!
//! Writes are never cached, rate limited or retried.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::WalletSelector;
use crate::observability::metrics;

/// Prepaid gas, in gas units. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Gas(pub u64);

impl Gas {
    pub const fn tgas(tera: u64) -> Self {
        Gas(tera * 1_000_000_000_000)
    }
}

/// Attached deposit, in yoctoNEAR. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Deposit(pub u128);

impl Deposit {
    pub const ZERO: Deposit = Deposit(0);
}

/// 30 TGas, enough for a single contract call.
pub const STANDARD_GAS: Gas = Gas::tgas(30);
/// 300 TGas, the per-transaction maximum, for bulk whitelist uploads.
pub const BATCH_GAS: Gas = Gas::tgas(300);
/// 0.1 NEAR, covering storage for a freshly minted badge.
pub const CLAIM_DEPOSIT: Deposit = Deposit(100_000_000_000_000_000_000_000);

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Deposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Gas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for Deposit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parameters of a function-call action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub method_name: String,
    pub args: Value,
    pub gas: Gas,
    pub deposit: Deposit,
}

/// One action inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "params")]
pub enum Action {
    FunctionCall(FunctionCall),
}

impl Action {
    pub fn function_call(method_name: &str, args: Value, gas: Gas, deposit: Deposit) -> Self {
        Action::FunctionCall(FunctionCall {
            method_name: method_name.to_string(),
            args,
            gas,
            deposit,
        })
    }

    pub fn method_name(&self) -> &str {
        match self {
            Action::FunctionCall(call) => &call.method_name,
        }
    }
}

/// A transaction as handed to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub signer_id: String,
    pub receiver_id: String,
    pub actions: Vec<Action>,
}

/// What a wallet reports after submitting. Wallets answer in one of two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransactionOutcome {
    Executed { transaction_outcome: OutcomeId },
    Submitted { transaction: TransactionHash },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutcomeId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionHash {
    pub hash: String,
}

impl TransactionOutcome {
    /// Transaction id, whichever shape the wallet used.
    pub fn id(&self) -> &str {
        match self {
            TransactionOutcome::Executed { transaction_outcome } => &transaction_outcome.id,
            TransactionOutcome::Submitted { transaction } => &transaction.hash,
        }
    }
}

/// Sign and submit `actions` against `receiver_id` as the active account.
pub async fn send_transaction(
    selector: &dyn WalletSelector,
    receiver_id: &str,
    actions: Vec<Action>,
) -> BlockchainResult<TransactionOutcome> {
    let signer_id = match selector.active_account_id() {
        Some(account) if selector.is_signed_in() => account,
        _ => {
            return Err(BlockchainError::NotAvailable(
                "Wallet not ready or not signed in".to_string(),
            ))
        }
    };

    let method = actions
        .first()
        .map(|a| a.method_name().to_string())
        .unwrap_or_default();
    let request = TransactionRequest {
        signer_id,
        receiver_id: receiver_id.to_string(),
        actions,
    };

    let wallet = selector.wallet().await?;
    match wallet.sign_and_send_transaction(&request).await {
        Ok(outcome) => {
            tracing::info!(
                signer = %request.signer_id,
                receiver = %request.receiver_id,
                method = %method,
                tx_id = %outcome.id(),
                "Transaction submitted"
            );
            metrics::record_transaction(&method, "success");
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!(
                signer = %request.signer_id,
                method = %method,
                error = %e,
                "Transaction failed"
            );
            metrics::record_transaction(&method, "failure");
            Err(e)
        }
    }
}
