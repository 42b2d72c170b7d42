//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (NEAR_* / FASTNEAR_API_KEY env overrides)
//!     → validation.rs (semantic checks)
//!     → BadgeConfig (validated, immutable)
//!     → handed to the read pipeline and badge contract at construction
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - API keys are never logged

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_with_overrides, parse_config, ConfigError};
pub use schema::{
    BadgeConfig, CacheConfig, NetworkConfig, NetworkId, ObservabilityConfig, RateLimitConfig,
    RetryConfig,
};
