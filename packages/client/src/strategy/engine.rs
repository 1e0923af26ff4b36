//! Strategy engine: classification, dispatch and shared helpers

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{RevalidationRegistry, Served, ResponseSource, Strategy};
use crate::cache::eligibility::{self, Eligibility};
use crate::cache::{CacheEntry, CacheStore, NamespaceHandle, RequestId};
use crate::config::{EngineConfig, RouteBinding};
use crate::error::Result;
use crate::fetch::{AbortSignal, Fetcher};
use crate::http::{HttpResponse, InterceptedRequest};
use crate::routing::{BypassReason, RouteClass, RouteRules};
use crate::telemetry::CacheStats;

/// What the interception point should do with a request
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// Let the platform perform the request natively, without cache involvement
    Bypass {
        request: InterceptedRequest,
        reason: BypassReason,
    },
    /// Respond with this response
    Respond(Served),
}

impl Interception {
    #[must_use]
    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass { .. })
    }

    #[must_use]
    pub fn served(&self) -> Option<&Served> {
        match self {
            Self::Respond(served) => Some(served),
            Self::Bypass { .. } => None,
        }
    }
}

/// Runs the configured strategies for one deployed version
///
/// Cloning shares the store, fetcher, revalidation registry and preload flag.
#[derive(Clone)]
pub struct StrategyEngine {
    pub(super) config: Arc<EngineConfig>,
    pub(super) rules: Arc<RouteRules>,
    pub(super) store: CacheStore,
    pub(super) fetcher: Arc<dyn Fetcher>,
    pub(super) revalidations: RevalidationRegistry,
    pub(super) navigation_preload: Arc<AtomicBool>,
    pub(super) writes_halted: Arc<AtomicBool>,
}

impl StrategyEngine {
    pub fn new(config: Arc<EngineConfig>, store: CacheStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let rules = Arc::new(RouteRules::from_config(&config));
        Self {
            config,
            rules,
            store,
            fetcher,
            revalidations: RevalidationRegistry::new(),
            navigation_preload: Arc::new(AtomicBool::new(false)),
            writes_halted: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<CacheStats> {
        self.store.stats()
    }

    #[must_use]
    pub fn revalidations(&self) -> &RevalidationRegistry {
        &self.revalidations
    }

    /// Flag flipped by activation when navigation preload becomes available
    #[must_use]
    pub fn navigation_preload_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.navigation_preload)
    }

    #[must_use]
    pub fn navigation_preload_enabled(&self) -> bool {
        self.navigation_preload.load(Ordering::Acquire)
    }

    /// Stop storing responses; in-flight work still serves its callers
    ///
    /// Checked under each namespace's write lock, so once this returns no
    /// write from this engine can land after a later namespace deletion.
    pub fn halt_writes(&self) {
        self.writes_halted.store(true, Ordering::Release);
    }

    pub fn resume_writes(&self) {
        self.writes_halted.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn writes_halted(&self) -> bool {
        self.writes_halted.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn classify(&self, request: &InterceptedRequest) -> RouteClass {
        self.rules.classify(request)
    }

    /// Classify `request` and run its bound strategy
    ///
    /// `preload` is the platform's navigation preload response, if it is
    /// already available. The caller observes either a response from
    /// network or cache, or one synthesized offline response.
    pub async fn handle(
        &self,
        request: &InterceptedRequest,
        preload: Option<HttpResponse>,
    ) -> Interception {
        let binding = match self.classify(request) {
            RouteClass::Excluded(reason) => {
                self.stats().record_bypass();
                tracing::debug!(
                    target: "cachegate::strategy",
                    url = %request.url(),
                    %reason,
                    "Request bypassed"
                );
                return Interception::Bypass {
                    request: request.clone(),
                    reason,
                };
            }
            class => match class.binding(&self.config) {
                Some(binding) => binding,
                None => {
                    return Interception::Respond(
                        self.passthrough(request).await,
                    );
                }
            },
        };

        Interception::Respond(self.execute(binding, request, preload).await)
    }

    /// Run `binding` for `request`, skipping classification
    pub async fn execute(
        &self,
        binding: RouteBinding,
        request: &InterceptedRequest,
        preload: Option<HttpResponse>,
    ) -> Served {
        let id = match RequestId::from_request(request) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(target: "cachegate::strategy", error = %e, "Serving uncached");
                return self.passthrough(request).await;
            }
        };

        let namespace = self.store.open(&self.config.namespace(binding.namespace));
        let max_entries = self.config.max_entries_for(binding.namespace);

        tracing::trace!(
            target: "cachegate::strategy",
            key = %id,
            strategy = ?binding.strategy,
            namespace = namespace.name(),
            "Executing strategy"
        );

        match binding.strategy {
            Strategy::CacheFirst => self.cache_first(request, &id, &namespace, max_entries).await,
            Strategy::NetworkFirstTimeout(timeout) => {
                self.network_first(request, &id, &namespace, max_entries, timeout)
                    .await
            }
            Strategy::StaleWhileRevalidate => {
                self.stale_while_revalidate(request, &id, &namespace, max_entries)
                    .await
            }
            Strategy::NavigationPreload => {
                let preload = preload.filter(|_| self.navigation_preload_enabled());
                self.navigation(request, &id, &namespace, max_entries, preload)
                    .await
            }
        }
    }

    /// Cache read that degrades store failures to a miss
    pub(super) async fn lookup(
        &self,
        namespace: &NamespaceHandle,
        id: &RequestId,
    ) -> Option<HttpResponse> {
        match namespace.lookup(id).await {
            Ok(Some(entry)) => {
                self.stats().record_hit();
                tracing::debug!(
                    target: "cachegate::strategy",
                    namespace = namespace.name(),
                    key = %id,
                    "Cache hit"
                );
                Some(entry.to_response())
            }
            Ok(None) => {
                self.stats().record_miss();
                None
            }
            Err(e) => {
                self.stats().record_store_error();
                self.stats().record_miss();
                tracing::warn!(
                    target: "cachegate::strategy",
                    namespace = namespace.name(),
                    key = %id,
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    /// Persist `response` when the eligibility policy allows it
    ///
    /// Ineligible responses and store failures are absorbed; returns whether
    /// the response was stored.
    pub(super) async fn store_if_eligible(
        &self,
        namespace: &NamespaceHandle,
        id: &RequestId,
        response: &HttpResponse,
        max_entries: Option<usize>,
    ) -> bool {
        if let Eligibility::Ineligible(reason) = eligibility::evaluate(response) {
            self.stats().record_ineligible();
            tracing::debug!(
                target: "cachegate::strategy",
                namespace = namespace.name(),
                key = %id,
                %reason,
                "Response not cacheable"
            );
            return false;
        }

        match namespace
            .put_bounded_unless(
                id,
                CacheEntry::from_response(response),
                max_entries,
                &self.writes_halted,
            )
            .await
        {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::debug!(
                    target: "cachegate::strategy",
                    namespace = namespace.name(),
                    key = %id,
                    "Engine retired, response not stored"
                );
                false
            }
            Err(e) => {
                self.stats().record_store_error();
                tracing::warn!(
                    target: "cachegate::strategy",
                    namespace = namespace.name(),
                    key = %id,
                    error = %e,
                    "Cache write failed, continuing without caching"
                );
                false
            }
        }
    }

    pub(super) async fn fetch(
        &self,
        request: &InterceptedRequest,
        signal: AbortSignal,
    ) -> Result<HttpResponse> {
        let result = self.fetcher.fetch(request, signal).await;
        if let Err(ref e) = result {
            self.stats().record_network_failure();
            tracing::warn!(
                target: "cachegate::strategy",
                url = %request.url(),
                error = %e,
                "Fetch failed"
            );
        }
        result
    }

    /// Plain network fetch with no cache involvement
    pub(super) async fn passthrough(&self, request: &InterceptedRequest) -> Served {
        match self.fetch(request, AbortSignal::never()).await {
            Ok(response) => Served::new(response, ResponseSource::Network),
            Err(_) => self.offline(HttpResponse::offline_text()),
        }
    }

    pub(super) fn offline(&self, response: HttpResponse) -> Served {
        self.stats().record_offline();
        Served::new(response, ResponseSource::Offline)
    }
}

impl fmt::Debug for StrategyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyEngine")
            .field("version", &self.config.version)
            .field("store", &self.store)
            .field("revalidations", &self.revalidations)
            .field("navigation_preload", &self.navigation_preload_enabled())
            .field("writes_halted", &self.writes_halted())
            .finish()
    }
}
