//! Configuration management for ledgerd
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use ledgerd::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Storage root: {}", config.ledger.root_fs_path.display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `LEDGERD__<section>__<key>`
//!
//! Examples:
//! - `LEDGERD__LEDGER__ROOT_FS_PATH=/var/lib/ledgerd`
//! - `LEDGERD__SERVER__BIND_ADDR=127.0.0.1:7051`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/ledgerd.toml`.
//! This can be overridden using the `LEDGERD_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, HistoryConfig, LedgerConfig, ServerConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Configuration rooted at `root`, everything else defaulted
    pub fn for_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            ledger: LedgerConfig::with_root(root),
            ..Self::default()
        }
    }
}
