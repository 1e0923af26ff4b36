//! Core `CacheGateBuilder` state and `build`

use std::fmt;
use std::sync::Arc;

use cachegate_client::config::{EngineConfig, Validator};
use cachegate_client::fetch::{Fetcher, HttpFetcher};
use cachegate_client::registration::Registration;
use cachegate_client::Result;
use url::Url;

use crate::CacheGate;
use crate::builder::storage::StoreChoice;

/// Fluent builder for a `CacheGate`
///
/// Starts from the default `EngineConfig`; every method overrides one field.
pub struct CacheGateBuilder {
    pub(crate) config: EngineConfig,
    pub(crate) store: StoreChoice,
    pub(crate) fetcher: Option<Arc<dyn Fetcher>>,
}

impl CacheGateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Start from a loaded configuration
    #[must_use]
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            store: StoreChoice::default(),
            fetcher: None,
        }
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config = self.config.with_version(version);
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: Url) -> Self {
        self.config = self.config.with_origin(origin);
        self
    }

    #[must_use]
    pub fn bootstrap_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.with_bootstrap_assets(assets);
        self
    }

    /// Add one path prefix that is never intercepted
    #[must_use]
    pub fn sensitive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.sensitive_prefixes.push(prefix.into());
        self
    }

    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.with_api_prefix(prefix);
        self
    }

    #[must_use]
    pub fn offline_document(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_offline_document(path);
        self
    }

    #[must_use]
    pub fn skip_waiting(mut self, skip_waiting: bool) -> Self {
        self.config = self.config.with_skip_waiting(skip_waiting);
        self
    }

    #[must_use]
    pub fn navigation_preload(mut self, enabled: bool) -> Self {
        self.config = self.config.with_navigation_preload(enabled);
        self
    }

    /// Use `fetcher` instead of the bundled hyper client
    #[must_use]
    pub fn fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the configuration and open the store
    ///
    /// Nothing is installed yet; call `CacheGate::deploy`.
    ///
    /// # Errors
    ///
    /// `Kind::Config` for invalid configuration, `Kind::StoreUnavailable`
    /// when a directory store cannot be opened.
    pub async fn build(self) -> Result<CacheGate> {
        self.config.validate()?;
        let store = self.store.open().await?;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };

        tracing::debug!(
            target: "cachegate::registration",
            version = %self.config.version,
            origin = %self.config.origin,
            "Gate built"
        );

        Ok(CacheGate {
            registration: Arc::new(Registration::new(store, fetcher)),
            config: self.config,
        })
    }
}

impl Default for CacheGateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheGateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGateBuilder")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("custom_fetcher", &self.fetcher.is_some())
            .finish()
    }
}
