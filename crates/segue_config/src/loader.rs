//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SegueConfig;
use std::path::Path;

/// Name of the configuration file looked up in a service directory.
pub const CONFIG_FILE_NAME: &str = "segue.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Loads and validates `segue.toml` from the given directory.
pub fn load_config(dir: &Path) -> Result<SegueConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `segue.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SegueConfig, ConfigError> {
    let config: SegueConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required values are present and within range.
fn validate_config(config: &SegueConfig) -> Result<(), ConfigError> {
    if config.content.latest_alias.trim().is_empty() {
        return Err(ConfigError::MissingField("content.latest_alias".to_string()));
    }
    if config.chemistry_checker.host.trim().is_empty() {
        return Err(ConfigError::MissingField(
            "chemistry_checker.host".to_string(),
        ));
    }
    if config.chemistry_checker.port == 0 {
        return Err(ConfigError::ValidationError(
            "chemistry_checker.port must be non-zero".to_string(),
        ));
    }
    if config.chemistry_checker.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "chemistry_checker.timeout_secs must be non-zero".to_string(),
        ));
    }
    let sig_figs = config.validation.default_significant_figures;
    if !(1..=15).contains(&sig_figs) {
        return Err(ConfigError::ValidationError(format!(
            "validation.default_significant_figures must be between 1 and 15, got {sig_figs}"
        )));
    }
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "unknown log level '{}'",
            config.logging.level
        )));
    }
    Ok(())
}
