//! Resilience subsystem for outbound view calls.
//!
//! # Data Flow
//! ```text
//! View call:
//!     → cache.rs (live entry? return it, no network, no limiter)
//!     → rate_limit.rs (admit? otherwise report Throttled)
//!     → dispatcher (wallet, then RPC)
//!     → cache.rs (store real values only)
//!
//! Opt-in retry of Throttled reads:
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Time comes from an injected `Clock` so windows and TTLs are testable
//! - Rolling log instead of a timer-reset counter; no background task
//! - Writes never pass through here

pub mod backoff;
pub mod cache;
pub mod clock;
pub mod rate_limit;

pub use cache::ResultCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::RateLimiter;
