//! NEAR contract access.
//!
//! # Data Flow
//! ```text
//! Reads:
//!     pipeline.rs (cache → rate limiter)
//!     → dispatcher.rs (wallet view if available, else RPC)
//!     → client.rs (JSON-RPC query, timeout, failover, payload decoding)
//!
//! Writes:
//!     transaction.rs (actions with gas/deposit)
//!     → wallet.rs (external signer)
//! ```
//!
//! # Security Constraints
//! - No keys are held here; signing belongs to the wallet
//! - Endpoint query strings (API keys) are stripped before logging
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod dispatcher;
pub mod pipeline;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::RpcClient;
pub use dispatcher::{QueryDispatcher, ViewSource};
pub use pipeline::ReadPipeline;
pub use transaction::{send_transaction, Action, Deposit, Gas, TransactionOutcome, TransactionRequest};
pub use types::{BlockchainError, BlockchainResult, CallSignature, ViewResult};
pub use wallet::{ViewRequest, WalletHandle, WalletSelector};
