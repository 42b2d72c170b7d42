//! Configuration validation.
//!
//! Serde handles the syntactic side; this module checks value ranges and
//! endpoint URLs. Every problem is reported, not just the first one.

use std::fmt;

use crate::config::schema::BadgeConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &BadgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    if network.contract_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "network.contract_name",
            "must not be empty",
        ));
    }

    if let Err(e) = url::Url::parse(&network.rpc_endpoint()) {
        errors.push(ValidationError::new(
            "network.rpc_url",
            format!("invalid URL: {}", e),
        ));
    }

    for (i, failover) in network.failover_urls.iter().enumerate() {
        if let Err(e) = url::Url::parse(failover) {
            errors.push(ValidationError::new(
                format!("network.failover_urls[{}]", i),
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }

    if network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "network.rpc_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.rate_limit.max_per_window == 0 {
        errors.push(ValidationError::new(
            "rate_limit.max_per_window",
            "must be greater than zero",
        ));
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.window_secs",
            "must be greater than zero",
        ));
    }

    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
