//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! log_level = "info"
//!
//! [registry]
//! initial_capacity = 64
//!
//! [executor]
//! max_intents = 10
//! authority_window = 1
//! order_ttl = 1
//! exact_approvals = false
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::registry::MAX_INITIAL_CAPACITY;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub registry: RegistryConfig,
    pub executor: ExecutorConfig,
}

/// Market storage settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Intents pre-allocated per market, at most `MAX_INITIAL_CAPACITY`
    pub initial_capacity: usize,
}

/// Fill choreography settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Candidates considered when the caller does not say
    pub max_intents: usize,

    /// Seconds the counterparty's delegated authority stays valid
    pub authority_window: u64,

    /// Seconds until the submitted order expires
    pub order_ttl: u64,

    /// Approve exactly the pulled amount instead of an unlimited allowance
    pub exact_approvals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            registry: RegistryConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_intents: 10,
            authority_window: 1,
            order_ttl: 1,
            exact_approvals: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "registry.initial_capacity must be <= {}",
                MAX_INITIAL_CAPACITY
            )));
        }
        if self.executor.max_intents == 0 {
            return Err(ConfigError::Invalid("executor.max_intents must be > 0".into()));
        }
        if self.executor.authority_window == 0 {
            return Err(ConfigError::Invalid(
                "executor.authority_window must be > 0".into(),
            ));
        }
        if self.executor.order_ttl == 0 {
            return Err(ConfigError::Invalid("executor.order_ttl must be > 0".into()));
        }
        Ok(())
    }
}
