//! # Document Engine
//!
//! Long-lived owner of the processor registry, the object pools and the
//! currency policies. Each block gets its own `BlockCoordinator`; pools are
//! shared across blocks.

use crate::config::{ConfigError, EngineConfig};
use crate::coordinator::{BlockCoordinator, ProcessorRegistry};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use crate::processor::ProcessorPools;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for processing blocks of document operations.
pub struct DocumentEngine {
    registry: Arc<ProcessorRegistry>,
    pools: Arc<ProcessorPools>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    config: EngineConfig,
}

impl DocumentEngine {
    /// Engine with the document processors registered.
    ///
    /// Without `policies` no fees are charged and no balances are checked.
    pub fn new(
        config: EngineConfig,
        policies: Option<Arc<dyn CurrencyPolicies>>,
    ) -> Result<Self, ConfigError> {
        Self::with_registry(config, policies, ProcessorRegistry::with_document_processors())
    }

    /// Engine with a custom processor registry.
    pub fn with_registry(
        config: EngineConfig,
        policies: Option<Arc<dyn CurrencyPolicies>>,
        registry: ProcessorRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            processors = registry.len(),
            max_items = config.max_items_per_operation,
            fees = policies.is_some(),
            "document engine initialized"
        );
        Ok(Self {
            registry: Arc::new(registry),
            pools: Arc::new(ProcessorPools::new(config.pool_idle_capacity)),
            policies,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pools shared by every block of this engine.
    #[must_use]
    pub fn pools(&self) -> &Arc<ProcessorPools> {
        &self.pools
    }

    /// Starts block `height` against `ledger`.
    pub fn new_block<L>(&self, height: u64, ledger: Arc<L>) -> BlockCoordinator<L>
    where
        L: StateReader + StateWriter,
    {
        debug!(height, "block opened");
        BlockCoordinator::new(
            height,
            ledger,
            Arc::clone(&self.registry),
            Arc::clone(&self.pools),
            self.policies.clone(),
            self.config.clone(),
        )
    }
}
