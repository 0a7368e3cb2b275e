//! Parsing and validation of `segue.toml` service configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`SegueConfig`] covering the content store location, validation defaults,
//! the external chemistry checker endpoint and logging settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
