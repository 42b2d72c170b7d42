//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BadgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BadgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BadgeConfig, ConfigError> {
    let config: BadgeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the config file if given, apply environment overrides, then
/// `overrides` (command line flags), and validate the result once.
///
/// Without a file the defaults are used. A file is only validated after all
/// overrides, so the environment may fill in what it leaves out.
pub fn load_with_overrides<F>(path: Option<&Path>, overrides: F) -> Result<BadgeConfig, ConfigError>
where
    F: FnOnce(&mut BadgeConfig),
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => BadgeConfig::default(),
    };
    config.apply_env_overrides();
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [network]
            contract_name = "poap.testnet"
            rpc_timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.network.contract_name, "poap.testnet");
        assert_eq!(config.network.rpc_timeout_secs, 3);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[network\ncontract_name = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config(
            r#"
            [rate_limit]
            window_secs = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: rate_limit.window_secs: must be greater than zero"
        );
    }

    #[test]
    fn test_overrides_are_validated() {
        let err = load_with_overrides(None, |config| config.network.contract_name = String::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("network.contract_name"));

        let config = load_with_overrides(None, |config| {
            config.network.contract_name = "badges.testnet".into()
        })
        .unwrap();
        assert_eq!(config.network.contract_name, "badges.testnet");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
