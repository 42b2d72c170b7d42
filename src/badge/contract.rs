//! Typed access to the badge contract.
//!
//! Reads go through the shared [`ReadPipeline`] with a freshness chosen per
//! call site; writes go straight to the wallet.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::badge::magic_link::normalize_event_name;
use crate::badge::types::{AccountRoles, BadgeToken, Event};
use crate::badge::whitelist::{batches, screen_addresses};
use crate::blockchain::transaction::{
    send_transaction, Action, Deposit, Gas, TransactionOutcome, BATCH_GAS, CLAIM_DEPOSIT,
    STANDARD_GAS,
};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ViewResult};
use crate::blockchain::wallet::WalletSelector;
use crate::blockchain::ReadPipeline;

/// Event list freshness.
pub const EVENTS_TTL: Duration = Duration::from_secs(60);
/// Role checks change rarely.
pub const ROLE_TTL: Duration = Duration::from_secs(300);
/// Organizer and manager rosters.
pub const ROSTER_TTL: Duration = Duration::from_secs(120);
/// Whitelists are edited while the page is open.
pub const WHITELIST_TTL: Duration = Duration::from_secs(30);
/// Owned badges.
pub const BADGES_TTL: Duration = Duration::from_secs(60);

/// Result of a bulk whitelist upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistUpload {
    /// Valid, distinct addresses submitted.
    pub added: usize,
    /// One outcome per batch, in order.
    pub outcomes: Vec<TransactionOutcome>,
}

/// Counts writes in progress; released on drop so every exit path clears it.
struct BusyGuard(Arc<AtomicUsize>);

impl BusyGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Client for one deployed badge contract.
#[derive(Clone)]
pub struct BadgeContract {
    contract_id: String,
    pipeline: Arc<ReadPipeline>,
    wallet: Option<Arc<dyn WalletSelector>>,
    busy: Arc<AtomicUsize>,
}

impl BadgeContract {
    /// Read-only client; writes fail with `NotAvailable` until a wallet is attached.
    pub fn new(contract_id: impl Into<String>, pipeline: Arc<ReadPipeline>) -> Self {
        Self {
            contract_id: contract_id.into(),
            pipeline,
            wallet: None,
            busy: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletSelector>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Whether a write is waiting on the wallet.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) > 0
    }

    async fn view<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
        ttl: Duration,
    ) -> BlockchainResult<ViewResult<T>> {
        self.pipeline
            .view_as(self.wallet.clone(), &self.contract_id, method, args, ttl)
            .await
    }

    // ---- reads ----

    pub async fn all_events(&self) -> BlockchainResult<ViewResult<Vec<Event>>> {
        Ok(self
            .view("get_all_events", json!({}), EVENTS_TTL)
            .await?
            .or_empty(Vec::new()))
    }

    pub async fn is_owner(&self, account_id: &str) -> BlockchainResult<ViewResult<bool>> {
        self.role_check("is_owner", account_id).await
    }

    pub async fn is_organizer(&self, account_id: &str) -> BlockchainResult<ViewResult<bool>> {
        self.role_check("is_organizer", account_id).await
    }

    pub async fn is_manager(&self, account_id: &str) -> BlockchainResult<ViewResult<bool>> {
        self.role_check("is_manager", account_id).await
    }

    async fn role_check(&self, method: &str, account_id: &str) -> BlockchainResult<ViewResult<bool>> {
        Ok(self
            .view(method, json!({ "account_id": account_id }), ROLE_TTL)
            .await?
            .or_empty(false))
    }

    /// All three role checks, run concurrently. Throttled if any check was.
    pub async fn roles(&self, account_id: &str) -> BlockchainResult<ViewResult<AccountRoles>> {
        let (owner, organizer, manager) = tokio::join!(
            self.is_owner(account_id),
            self.is_organizer(account_id),
            self.is_manager(account_id),
        );
        match (owner?, organizer?, manager?) {
            (ViewResult::Value(is_owner), ViewResult::Value(is_organizer), ViewResult::Value(is_manager)) => {
                Ok(ViewResult::Value(AccountRoles {
                    is_owner,
                    is_organizer,
                    is_manager,
                }))
            }
            _ => Ok(ViewResult::Throttled),
        }
    }

    pub async fn organizers(&self) -> BlockchainResult<ViewResult<Vec<String>>> {
        Ok(self
            .view("get_organizers", json!({}), ROSTER_TTL)
            .await?
            .or_empty(Vec::new()))
    }

    pub async fn managers(&self) -> BlockchainResult<ViewResult<Vec<String>>> {
        Ok(self
            .view("get_managers", json!({}), ROSTER_TTL)
            .await?
            .or_empty(Vec::new()))
    }

    pub async fn whitelist(&self, event_name: &str) -> BlockchainResult<ViewResult<Vec<String>>> {
        Ok(self
            .view("get_whitelist", json!({ "event_name": event_name }), WHITELIST_TTL)
            .await?
            .or_empty(Vec::new()))
    }

    pub async fn badges_for_owner(
        &self,
        account_id: &str,
    ) -> BlockchainResult<ViewResult<Vec<BadgeToken>>> {
        Ok(self
            .view("nft_tokens_for_owner", json!({ "account_id": account_id }), BADGES_TTL)
            .await?
            .or_empty(Vec::new()))
    }

    // ---- writes ----

    async fn call(
        &self,
        method: &str,
        args: Value,
        gas: Gas,
        deposit: Deposit,
    ) -> BlockchainResult<TransactionOutcome> {
        let selector = self.wallet.as_deref().ok_or_else(|| {
            BlockchainError::NotAvailable("Wallet not ready or not signed in".to_string())
        })?;
        let _busy = BusyGuard::acquire(&self.busy);
        send_transaction(
            selector,
            &self.contract_id,
            vec![Action::function_call(method, args, gas, deposit)],
        )
        .await
    }

    /// Create an event. The name is normalized the same way claims are.
    pub async fn create_event(
        &self,
        name: &str,
        description: &str,
        media: Option<&str>,
    ) -> BlockchainResult<TransactionOutcome> {
        let name = normalize_event_name(name);
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return Err(BlockchainError::InvalidInput(
                "event name and description are required".to_string(),
            ));
        }

        let mut args = json!({ "name": name, "description": description });
        if let Some(media) = media.map(str::trim).filter(|m| !m.is_empty()) {
            args["media"] = json!(media);
        }
        self.call("create_event", args, STANDARD_GAS, Deposit::ZERO).await
    }

    /// Claim the badge for an event, attaching the storage deposit.
    pub async fn claim_badge(&self, event_name: &str) -> BlockchainResult<TransactionOutcome> {
        let event_name = require_event_name(event_name)?;
        self.call(
            "claim_badge",
            json!({ "event_name": event_name }),
            STANDARD_GAS,
            CLAIM_DEPOSIT,
        )
        .await
    }

    pub async fn delete_event(&self, event_name: &str) -> BlockchainResult<TransactionOutcome> {
        let event_name = require_event_name(event_name)?;
        self.call(
            "delete_event",
            json!({ "event_name": event_name }),
            STANDARD_GAS,
            Deposit::ZERO,
        )
        .await
    }

    pub async fn add_organizer(&self, account_id: &str) -> BlockchainResult<TransactionOutcome> {
        self.grant("add_organizer", account_id).await
    }

    pub async fn add_manager(&self, account_id: &str) -> BlockchainResult<TransactionOutcome> {
        self.grant("add_manager", account_id).await
    }

    pub async fn add_admin(&self, account_id: &str) -> BlockchainResult<TransactionOutcome> {
        self.grant("add_admin", account_id).await
    }

    async fn grant(&self, method: &str, account_id: &str) -> BlockchainResult<TransactionOutcome> {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            return Err(BlockchainError::InvalidInput(
                "account id is required".to_string(),
            ));
        }
        self.call(
            method,
            json!({ "account_id": account_id }),
            STANDARD_GAS,
            Deposit::ZERO,
        )
        .await
    }

    /// Add accounts to an event's whitelist in a single transaction.
    pub async fn add_to_whitelist(
        &self,
        event_name: &str,
        account_ids: &[String],
    ) -> BlockchainResult<TransactionOutcome> {
        let event_name = require_event_name(event_name)?;
        let account_ids = screen_addresses(account_ids);
        if account_ids.is_empty() {
            return Err(BlockchainError::InvalidInput(
                "no valid NEAR account ids".to_string(),
            ));
        }
        self.call(
            "add_to_whitelist",
            json!({ "event_name": event_name, "account_ids": account_ids }),
            STANDARD_GAS,
            Deposit::ZERO,
        )
        .await
    }

    /// Upload a large address list in batches, stopping at the first failure.
    pub async fn upload_whitelist<I, S>(
        &self,
        event_name: &str,
        addresses: I,
    ) -> BlockchainResult<WhitelistUpload>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let event_name = require_event_name(event_name)?;
        let addresses = screen_addresses(addresses);
        if addresses.is_empty() {
            return Err(BlockchainError::InvalidInput(
                "no valid NEAR account ids".to_string(),
            ));
        }

        let total = addresses.len().div_ceil(crate::badge::whitelist::WHITELIST_BATCH_SIZE);
        let mut outcomes = Vec::with_capacity(total);
        for (i, batch) in batches(&addresses).enumerate() {
            let outcome = self
                .call(
                    "add_to_whitelist",
                    json!({ "event_name": event_name, "account_ids": batch }),
                    BATCH_GAS,
                    Deposit::ZERO,
                )
                .await
                .map_err(|e| {
                    BlockchainError::Transaction(format!(
                        "batch {} of {} failed: {}",
                        i + 1,
                        total,
                        e
                    ))
                })?;
            tracing::info!(batch = i + 1, total, event = %event_name, "Whitelist batch uploaded");
            outcomes.push(outcome);
        }

        Ok(WhitelistUpload {
            added: addresses.len(),
            outcomes,
        })
    }
}

fn require_event_name(raw: &str) -> BlockchainResult<String> {
    let name = normalize_event_name(raw);
    if name.is_empty() {
        return Err(BlockchainError::InvalidInput(
            "event name is required".to_string(),
        ));
    }
    Ok(name)
}

impl std::fmt::Debug for BadgeContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BadgeContract")
            .field("contract_id", &self.contract_id)
            .field("wallet", &self.wallet.is_some())
            .finish()
    }
}
