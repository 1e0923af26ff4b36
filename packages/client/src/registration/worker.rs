use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::fetch::Fetcher;
use crate::lifecycle::{LifecycleManager, LifecycleState};
use crate::strategy::StrategyEngine;

/// One deployed version: its lifecycle and the engine serving its requests
#[derive(Debug)]
pub struct Worker {
    lifecycle: LifecycleManager,
    engine: StrategyEngine,
}

impl Worker {
    pub fn new(config: EngineConfig, store: CacheStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let config = Arc::new(config);
        let engine = StrategyEngine::new(Arc::clone(&config), store.clone(), Arc::clone(&fetcher));
        let lifecycle =
            LifecycleManager::new(config, store, fetcher, engine.navigation_preload_flag());
        Self { lifecycle, engine }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        self.lifecycle.version()
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    #[must_use]
    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    /// Mark this version superseded; its engine stops writing to the store
    pub fn retire(&self) {
        self.engine.halt_writes();
        self.lifecycle.retire();
    }
}
