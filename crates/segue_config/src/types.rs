//! Configuration types deserialized from `segue.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// Default number of significant figures used by numeric comparisons when a
/// question does not set its own bounds.
pub const DEFAULT_SIGNIFICANT_FIGURES: u32 = 2;

/// The top-level service configuration parsed from `segue.toml`.
///
/// Every section is optional; a file containing nothing yields a configuration
/// suitable for a local content checkout and a checker on `localhost`.
#[derive(Debug, Default, Deserialize)]
pub struct SegueConfig {
    /// Where content versions are read from and how aliases are stored.
    #[serde(default)]
    pub content: ContentConfig,
    /// Defaults applied by the answer validators.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Location of the external symbolic chemistry checker.
    #[serde(default)]
    pub chemistry_checker: CheckerConfig,
    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Content store settings.
#[derive(Debug, Deserialize)]
pub struct ContentConfig {
    /// Root of the snapshot store, one subdirectory per commit SHA.
    #[serde(default = "default_store")]
    pub store: PathBuf,
    /// File in which named version aliases are persisted.
    #[serde(default = "default_aliases_file")]
    pub aliases_file: PathBuf,
    /// Alias pointed at each newly indexed version by the background indexer.
    #[serde(default = "default_latest_alias")]
    pub latest_alias: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            aliases_file: default_aliases_file(),
            latest_alias: default_latest_alias(),
        }
    }
}

fn default_store() -> PathBuf {
    PathBuf::from("content")
}

fn default_aliases_file() -> PathBuf {
    PathBuf::from("content_indices.toml")
}

fn default_latest_alias() -> String {
    "latest".to_string()
}

/// Validation defaults.
#[derive(Debug, Deserialize)]
pub struct ValidationConfig {
    /// Significant figures used when a question leaves its bounds unset.
    #[serde(default = "default_significant_figures")]
    pub default_significant_figures: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_significant_figures: DEFAULT_SIGNIFICANT_FIGURES,
        }
    }
}

fn default_significant_figures() -> u32 {
    DEFAULT_SIGNIFICANT_FIGURES
}

/// Endpoint of the external chemistry and nuclear equation checker.
#[derive(Debug, Deserialize)]
pub struct CheckerConfig {
    /// Hostname of the checker service.
    #[serde(default = "default_checker_host")]
    pub host: String,
    /// TCP port of the checker service.
    #[serde(default = "default_checker_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_checker_timeout")]
    pub timeout_secs: u64,
}

impl CheckerConfig {
    /// Returns the `http://host:port` base URL of the checker.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            host: default_checker_host(),
            port: default_checker_port(),
            timeout_secs: default_checker_timeout(),
        }
    }
}

fn default_checker_host() -> String {
    "localhost".to_string()
}

fn default_checker_port() -> u16 {
    5000
}

fn default_checker_timeout() -> u64 {
    10
}

/// Logging settings.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format for log lines.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log line format.
#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn log_format_all_variants() {
        for (input, expected) in [("text", LogFormat::Text), ("json", LogFormat::Json)] {
            let toml = format!(
                r#"
[logging]
format = "{input}"
"#
            );
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.logging.format, expected);
        }
    }

    #[test]
    fn checker_base_url() {
        let checker = CheckerConfig {
            host: "chemistry-checker".to_string(),
            port: 5001,
            timeout_secs: 3,
        };
        assert_eq!(checker.base_url(), "http://chemistry-checker:5001");
    }

    #[test]
    fn content_defaults() {
        let content = ContentConfig::default();
        assert_eq!(content.store, PathBuf::from("content"));
        assert_eq!(content.latest_alias, "latest");
    }
}
