use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::watch;

use super::{ClientRegistry, InvalidTransition, LifecycleState};
use crate::cache::eligibility::{self, Eligibility};
use crate::cache::{CacheEntry, CacheStore, NamespaceKind, NamespaceName, RequestId};
use crate::config::EngineConfig;
use crate::error::{self, Result};
use crate::fetch::{AbortSignal, Fetcher};
use crate::http::{HttpResponse, InterceptedRequest};

/// Drives one version through install and activation
pub struct LifecycleManager {
    config: Arc<EngineConfig>,
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    state: watch::Sender<LifecycleState>,
    navigation_preload: Arc<AtomicBool>,
}

impl LifecycleManager {
    /// `navigation_preload` is the flag shared with the strategy engine
    pub fn new(
        config: Arc<EngineConfig>,
        store: CacheStore,
        fetcher: Arc<dyn Fetcher>,
        navigation_preload: Arc<AtomicBool>,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::Parsed);
        Self {
            config,
            store,
            fetcher,
            state,
            navigation_preload,
        }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn navigation_preload_enabled(&self) -> bool {
        self.navigation_preload.load(Ordering::Acquire)
    }

    /// Pre-warm `static-{version}` with every bootstrap asset
    ///
    /// All assets are fetched concurrently and must come back cacheable
    /// before anything is written. Any failure removes the static namespace
    /// of this version and leaves the worker `Redundant`; other versions are
    /// never touched.
    ///
    /// # Errors
    ///
    /// Returns `Kind::Install` wrapping the first failure.
    pub async fn install(&self) -> Result<usize> {
        self.transition(LifecycleState::Parsed, LifecycleState::Installing)?;
        let name = self.config.namespace(NamespaceKind::Static);

        tracing::info!(
            target: "cachegate::lifecycle",
            version = self.version(),
            assets = self.config.bootstrap_assets.len(),
            "Installing"
        );

        match self.prewarm(&name).await {
            Ok(count) => {
                self.state.send_replace(LifecycleState::Waiting);
                tracing::info!(
                    target: "cachegate::lifecycle",
                    version = self.version(),
                    namespace = %name,
                    cached = count,
                    "Installed, waiting"
                );
                Ok(count)
            }
            Err(e) => {
                if let Err(cleanup) = self.store.delete_namespace(&name.to_string()).await {
                    tracing::warn!(
                        target: "cachegate::lifecycle",
                        namespace = %name,
                        error = %cleanup,
                        "Failed to remove partial static namespace"
                    );
                }
                self.state.send_replace(LifecycleState::Redundant);
                tracing::error!(
                    target: "cachegate::lifecycle",
                    version = self.version(),
                    error = %e,
                    "Install failed"
                );
                Err(if e.is_install() { e } else { error::install(e) })
            }
        }
    }

    async fn prewarm(&self, name: &NamespaceName) -> Result<usize> {
        let requests = self
            .config
            .bootstrap_assets
            .iter()
            .map(|path| self.config.resolve(path).map(InterceptedRequest::get))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let fetched = join_all(requests.iter().map(|request| async move {
            let response = self.fetcher.fetch(request, AbortSignal::never()).await;
            (request, response)
        }))
        .await;

        let mut assets: Vec<(RequestId, HttpResponse)> = Vec::with_capacity(fetched.len());
        for (request, response) in fetched {
            let response = response?;
            if let Eligibility::Ineligible(reason) = eligibility::evaluate(&response) {
                return Err(error::install(format!(
                    "bootstrap asset {} not cacheable: {reason}",
                    request.url()
                )));
            }
            assets.push((RequestId::from_request(request)?, response));
        }

        let namespace = self.store.open(name);
        for (id, response) in &assets {
            namespace.put(id, CacheEntry::from_response(response)).await?;
        }
        Ok(assets.len())
    }

    /// Cut over to this version
    ///
    /// Deletes every namespace outside this version's live set, enables
    /// navigation preload when configured and claims all connected clients.
    /// Returns the number of namespaces deleted.
    ///
    /// # Errors
    ///
    /// Fails when the worker is not `Waiting` or the store cannot be listed
    /// or pruned; a failed activation returns to `Waiting`.
    pub async fn activate(&self, clients: &ClientRegistry) -> Result<usize> {
        self.transition(LifecycleState::Waiting, LifecycleState::Activating)?;

        let deleted = match self.prune().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.state.send_replace(LifecycleState::Waiting);
                tracing::error!(
                    target: "cachegate::lifecycle",
                    version = self.version(),
                    error = %e,
                    "Activation failed"
                );
                return Err(e);
            }
        };

        if self.config.navigation_preload {
            self.navigation_preload.store(true, Ordering::Release);
        }
        let claimed = clients.claim(self.version());
        self.state.send_replace(LifecycleState::Active);

        tracing::info!(
            target: "cachegate::lifecycle",
            version = self.version(),
            deleted,
            claimed,
            "Activated"
        );
        Ok(deleted)
    }

    async fn prune(&self) -> Result<usize> {
        let live = NamespaceName::live_set(self.version());
        let mut deleted = 0;
        for name in self.store.namespaces().await? {
            if live.contains(&name) {
                continue;
            }
            if self.store.delete_namespace(&name).await? {
                deleted += 1;
                tracing::debug!(target: "cachegate::lifecycle", namespace = %name, "Deleted stale namespace");
            }
        }
        Ok(deleted)
    }

    /// Mark this version as superseded
    pub fn retire(&self) {
        self.navigation_preload.store(false, Ordering::Release);
        self.state.send_replace(LifecycleState::Redundant);
        tracing::debug!(target: "cachegate::lifecycle", version = self.version(), "Retired");
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<()> {
        let mut allowed = true;
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                allowed = false;
                false
            }
        });
        if allowed {
            Ok(())
        } else {
            Err(error::configuration(InvalidTransition {
                from: self.state(),
                to,
            }))
        }
    }
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("version", &self.config.version)
            .field("state", &self.state())
            .finish()
    }
}
