//! Shared fixtures for integration tests: a fake RPC node and stub wallets.
#![allow(dead_code)]

use async_trait::async_trait;
use httpmock::MockServer;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use near_badge::blockchain::{
    BlockchainError, BlockchainResult, RpcClient, TransactionOutcome, TransactionRequest,
    ViewRequest, ViewSource, WalletHandle, WalletSelector,
};

/// JSON-RPC success envelope carrying `bytes` as the view result.
pub fn rpc_bytes(bytes: &[u8]) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": "dontcare",
        "result": {
            "result": bytes,
            "logs": [],
            "block_height": 17,
            "block_hash": "9MzuZrRPW1BGpFnZJUJg6SzCrixPpJDfjsNeUobRXsLe"
        }
    })
}

/// JSON-RPC success envelope whose view result is `value` serialized as JSON.
pub fn rpc_json(value: &Value) -> Value {
    rpc_bytes(&serde_json::to_vec(value).unwrap())
}

/// JSON-RPC error envelope.
pub fn rpc_error(message: &str, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": "dontcare",
        "error": { "code": -32000, "message": message, "data": data }
    })
}

pub fn rpc_client(servers: &[&MockServer]) -> RpcClient {
    rpc_client_with_timeout(servers, Duration::from_secs(5))
}

pub fn rpc_client_with_timeout(servers: &[&MockServer], timeout: Duration) -> RpcClient {
    let endpoints = servers
        .iter()
        .map(|s| s.url("/").parse().unwrap())
        .collect();
    RpcClient::with_endpoints(endpoints, timeout).unwrap()
}

/// How a stub wallet answers view calls.
#[derive(Clone)]
pub enum ViewBehavior {
    Unsupported,
    Answer(Value),
    Fail(String),
}

/// A wallet whose behavior is fixed up front and whose traffic is recorded.
pub struct StubWallet {
    pub view: ViewBehavior,
    pub view_calls: AtomicU32,
    /// 1-based transaction number that fails, if any.
    pub fail_transaction: Option<usize>,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl StubWallet {
    pub fn new(view: ViewBehavior) -> Self {
        Self {
            view,
            view_calls: AtomicU32::new(0),
            fail_transaction: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_transaction(mut self, n: usize) -> Self {
        self.fail_transaction = Some(n);
        self
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn view_calls(&self) -> u32 {
        self.view_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletHandle for StubWallet {
    fn supports_view_method(&self) -> bool {
        !matches!(self.view, ViewBehavior::Unsupported)
    }

    async fn view_method(&self, _request: &ViewRequest) -> BlockchainResult<Value> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        match &self.view {
            ViewBehavior::Answer(value) => Ok(value.clone()),
            ViewBehavior::Fail(message) => Err(BlockchainError::Wallet(message.clone())),
            ViewBehavior::Unsupported => Err(BlockchainError::NotAvailable("no view".into())),
        }
    }

    async fn sign_and_send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> BlockchainResult<TransactionOutcome> {
        let n = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(request.clone());
            sent.len()
        };
        if self.fail_transaction == Some(n) {
            return Err(BlockchainError::Wallet("User rejected the request".into()));
        }
        Ok(serde_json::from_value(json!({ "transaction_outcome": { "id": format!("tx-{}", n) } }))
            .unwrap())
    }

    async fn sign_out(&self) -> BlockchainResult<()> {
        Ok(())
    }
}

pub struct StubSelector {
    pub signed_in: bool,
    pub account: Option<String>,
    pub wallet: Arc<StubWallet>,
}

impl StubSelector {
    pub fn signed_in(account: &str, wallet: Arc<StubWallet>) -> Self {
        Self {
            signed_in: true,
            account: Some(account.to_string()),
            wallet,
        }
    }

    pub fn signed_out(wallet: Arc<StubWallet>) -> Self {
        Self {
            signed_in: false,
            account: None,
            wallet,
        }
    }
}

#[async_trait]
impl WalletSelector for StubSelector {
    fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    fn active_account_id(&self) -> Option<String> {
        self.account.clone()
    }

    async fn wallet(&self) -> BlockchainResult<Arc<dyn WalletHandle>> {
        Ok(self.wallet.clone())
    }
}

/// A view source answering by method name and recording every call.
#[derive(Default)]
pub struct RecordingSource {
    pub answers: HashMap<String, Value>,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingSource {
    pub fn answering(answers: &[(&str, Value)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(m, v)| (m.to_string(), v.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|(m, _)| m == method).count()
    }
}

#[async_trait]
impl ViewSource for RecordingSource {
    async fn query(
        &self,
        _wallet: Option<&dyn WalletSelector>,
        _contract_id: &str,
        method: &str,
        args: &Value,
    ) -> BlockchainResult<Option<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args.clone()));
        Ok(self.answers.get(method).cloned())
    }
}
