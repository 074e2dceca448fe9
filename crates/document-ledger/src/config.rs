//! Engine configuration.
//!
//! # Example
//!
//! ```ignore
//! use document_ledger::config::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_max_items_per_operation(20)
//!     .with_pool_idle_capacity(256);
//! config.validate().expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Hard upper bound on items per operation.
pub const MAX_ITEMS_LIMIT: usize = 1_000;

/// Errors raised by `EngineConfig::validate`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_items_per_operation must be between 1 and {MAX_ITEMS_LIMIT}, got {0}")]
    InvalidMaxItems(usize),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Tunables of the operation engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum items a single operation may carry.
    pub max_items_per_operation: usize,
    /// Idle processors kept per pool; extra instances are dropped on release.
    pub pool_idle_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_items_per_operation: 10,
            pool_idle_capacity: 128,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DL_MAX_ITEMS_PER_OPERATION`: Items per operation (default: 10)
    /// - `DL_POOL_IDLE_CAPACITY`: Idle processors per pool (default: 128)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_items_per_operation: env_usize(
                "DL_MAX_ITEMS_PER_OPERATION",
                defaults.max_items_per_operation,
            )?,
            pool_idle_capacity: env_usize("DL_POOL_IDLE_CAPACITY", defaults.pool_idle_capacity)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items_per_operation == 0 || self.max_items_per_operation > MAX_ITEMS_LIMIT {
            return Err(ConfigError::InvalidMaxItems(self.max_items_per_operation));
        }
        Ok(())
    }

    /// Builder-style method to set the item limit
    #[must_use]
    pub fn with_max_items_per_operation(mut self, max: usize) -> Self {
        self.max_items_per_operation = max;
        self
    }

    /// Builder-style method to set the pool capacity
    #[must_use]
    pub fn with_pool_idle_capacity(mut self, capacity: usize) -> Self {
        self.pool_idle_capacity = capacity;
        self
    }
}

fn env_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(default),
    }
}
