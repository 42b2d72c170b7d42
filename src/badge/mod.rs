//! Badge (POAP-style) contract surface.
//!
//! # Data Flow
//! ```text
//! contract.rs  typed reads (per-call-site TTL) ─▶ blockchain::ReadPipeline
//!              typed writes (gas, deposit)      ─▶ blockchain::send_transaction
//! magic_link.rs  ?event=<name> links for the claim form
//! whitelist.rs   account id screening and 50-per-transaction batching
//! ```

pub mod contract;
pub mod magic_link;
pub mod types;
pub mod whitelist;

pub use contract::{BadgeContract, WhitelistUpload};
pub use magic_link::{event_from_url, magic_link, normalize_event_name, resolve_claim_input};
pub use types::{AccountRoles, BadgeToken, Event, EventDetails, TokenMetadata};
