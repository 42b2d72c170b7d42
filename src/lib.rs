//! Client library for a NEAR event-badge (POAP-style) contract.
//!
//! Reads are cached, rate limited and resolved through the user's wallet when
//! it can answer view calls, falling back to a public RPC node. Writes are
//! handed to the wallet for signing.

pub mod badge;
pub mod blockchain;
pub mod config;
pub mod observability;
pub mod resilience;

pub use badge::BadgeContract;
pub use blockchain::{BlockchainError, BlockchainResult, ReadPipeline, ViewResult};
pub use config::BadgeConfig;
