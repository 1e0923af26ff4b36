//! cachegate public API
//!
//! Offline-first request interception with a fluent builder. Build a
//! `CacheGate`, deploy its configured version, then route every outgoing
//! request through `handle` or `respond`.
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! # async fn run() -> cachegate::Result<()> {
//! let gate = cachegate::CacheGate::builder()
//!     .version("v6.0.1")
//!     .api_timeout(Duration::from_secs(2))
//!     .build()
//!     .await?;
//! gate.deploy().await?;
//!
//! let client = gate.connect_client().await;
//! let response = gate.get(client, "/app.js").await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use http::Method;

pub mod builder;

pub use builder::{CacheGateBuilder, StoreChoice};

pub use cachegate_client::prelude::*;
pub use cachegate_client::{Error, Result};
pub use cachegate_client::{cache, config, error, fetch, strategy};

/// Handle on one deployed interception layer
#[derive(Debug, Clone)]
pub struct CacheGate {
    registration: Arc<Registration>,
    config: EngineConfig,
}

impl CacheGate {
    #[must_use]
    pub fn builder() -> CacheGateBuilder {
        CacheGateBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    /// Install the configured version, activating it when skip-waiting is on
    ///
    /// # Errors
    ///
    /// `Kind::Install` when a bootstrap asset cannot be pre-warmed,
    /// `Kind::Config` when this version is already active.
    pub async fn deploy(&self) -> Result<LifecycleState> {
        self.registration.update(self.config.clone()).await
    }

    /// Install a different version beside the active one
    ///
    /// # Errors
    ///
    /// Same as `deploy`.
    pub async fn deploy_config(&self, config: EngineConfig) -> Result<LifecycleState> {
        self.registration.update(config).await
    }

    /// Cut over to the waiting version, if any
    ///
    /// # Errors
    ///
    /// Propagates store failures while pruning stale namespaces.
    pub async fn activate_waiting(&self) -> Result<Option<String>> {
        self.registration.activate_waiting().await
    }

    pub async fn active_version(&self) -> Option<String> {
        self.registration.active_version().await
    }

    pub async fn connect_client(&self) -> ClientId {
        self.registration.connect().await
    }

    pub fn disconnect_client(&self, client: ClientId) -> bool {
        self.registration.disconnect(client)
    }

    pub async fn handle(&self, event: FetchEvent) -> Interception {
        self.registration.handle(event).await
    }

    /// Route `event`, performing bypassed requests natively
    ///
    /// # Errors
    ///
    /// Only a bypassed request's native fetch can fail.
    pub async fn respond(&self, event: FetchEvent) -> Result<HttpResponse> {
        self.registration.respond(event).await
    }

    /// Build a same-origin request for `path`
    ///
    /// # Errors
    ///
    /// `Kind::Config` when `path` does not resolve against the origin.
    pub fn request(&self, method: Method, path: &str) -> Result<InterceptedRequest> {
        let url = self.config.resolve(path)?;
        Ok(InterceptedRequest::new(method, url))
    }

    /// GET `path` on behalf of `client`
    ///
    /// # Errors
    ///
    /// See `request` and `respond`.
    pub async fn get(&self, client: ClientId, path: &str) -> Result<HttpResponse> {
        let request = self.request(Method::GET, path)?;
        self.respond(FetchEvent::new(request).from_client(client)).await
    }

    /// Navigate `client` to `path`
    ///
    /// # Errors
    ///
    /// See `request` and `respond`.
    pub async fn navigate(&self, client: ClientId, path: &str) -> Result<HttpResponse> {
        let url = self.config.resolve(path)?;
        let request = InterceptedRequest::navigation(url);
        self.respond(FetchEvent::new(request).from_client(client)).await
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.registration.stats()
    }
}
