//! Registration: the platform-facing holder of active and waiting workers
//!
//! Every fetch event is routed to the active worker. Updating installs a new
//! worker beside the active one; activation swaps them.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::cache::CacheStore;
use crate::config::{EngineConfig, Validator};
use crate::error::{self, Result};
use crate::fetch::{AbortSignal, Fetcher};
use crate::http::HttpResponse;
use crate::lifecycle::{ClientId, ClientRegistry, LifecycleState};
use crate::routing::BypassReason;
use crate::strategy::engine::Interception;
use crate::telemetry::CacheStatsSnapshot;

pub mod event;
pub mod worker;

pub use event::FetchEvent;
pub use worker::Worker;

/// Update rejected because the version is already deployed
#[derive(Debug, thiserror::Error)]
enum UpdateRejected {
    #[error("version {0} is already active")]
    AlreadyActive(String),
    #[error("version {0} is already installed and waiting")]
    AlreadyWaiting(String),
}

pub struct Registration {
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    clients: ClientRegistry,
    active: RwLock<Option<Arc<Worker>>>,
    waiting: RwLock<Option<Arc<Worker>>>,
    update_lock: Mutex<()>,
}

impl Registration {
    pub fn new(store: CacheStore, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            store,
            fetcher,
            clients: ClientRegistry::new(),
            active: RwLock::new(None),
            waiting: RwLock::new(None),
            update_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    #[must_use]
    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.store.stats().snapshot()
    }

    pub async fn active(&self) -> Option<Arc<Worker>> {
        self.active.read().await.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<Worker>> {
        self.waiting.read().await.clone()
    }

    pub async fn active_version(&self) -> Option<String> {
        self.active().await.map(|worker| worker.version().to_string())
    }

    /// Install `config` as a new version
    ///
    /// On success the new worker is waiting, or active when the config asks
    /// to skip waiting. Returns the new worker's state. On failure the active
    /// worker keeps serving.
    ///
    /// # Errors
    ///
    /// `Kind::Config` for invalid configs or a version equal to the active
    /// or waiting one; `Kind::Install` when pre-warming fails.
    pub async fn update(&self, config: EngineConfig) -> Result<LifecycleState> {
        config.validate()?;
        let _guard = self.update_lock.lock().await;

        if self.active_version().await.as_deref() == Some(config.version.as_str()) {
            return Err(error::configuration(UpdateRejected::AlreadyActive(config.version)));
        }
        let waiting = self.waiting().await;
        if waiting.is_some_and(|worker| worker.version() == config.version) {
            return Err(error::configuration(UpdateRejected::AlreadyWaiting(config.version)));
        }

        let skip_waiting = config.skip_waiting;
        let worker = Arc::new(Worker::new(config, self.store.clone(), Arc::clone(&self.fetcher)));
        worker.lifecycle().install().await?;

        if let Some(previous) = self.waiting.write().await.replace(Arc::clone(&worker)) {
            previous.retire();
        }

        if skip_waiting {
            self.activate_locked().await?;
        }
        Ok(worker.state())
    }

    /// Activate the waiting worker, if there is one
    ///
    /// Returns the activated version.
    ///
    /// # Errors
    ///
    /// Propagates store failures from pruning stale namespaces; the worker
    /// stays waiting.
    pub async fn activate_waiting(&self) -> Result<Option<String>> {
        let _guard = self.update_lock.lock().await;
        self.activate_locked().await
    }

    async fn activate_locked(&self) -> Result<Option<String>> {
        let Some(worker) = self.waiting.write().await.take() else {
            return Ok(None);
        };

        // The outgoing version stops writing before stale namespaces are pruned
        let current = self.active().await;
        if let Some(current) = &current {
            current.engine().halt_writes();
        }

        if let Err(e) = worker.lifecycle().activate(&self.clients).await {
            if let Some(current) = &current {
                current.engine().resume_writes();
            }
            *self.waiting.write().await = Some(worker);
            return Err(e);
        }

        let previous = self.active.write().await.replace(Arc::clone(&worker));
        if let Some(previous) = previous {
            previous.retire();
        }
        Ok(Some(worker.version().to_string()))
    }

    /// Register a client; it starts controlled by the active version, if any
    pub async fn connect(&self) -> ClientId {
        let controller = self.active_version().await;
        self.clients.connect(controller)
    }

    pub fn disconnect(&self, client: ClientId) -> bool {
        self.clients.disconnect(client)
    }

    /// Route `event` to the active worker
    ///
    /// Without an active worker, or for a subresource request from a client
    /// the active version does not control, the request is bypassed. A
    /// navigation puts its client under the active version.
    pub async fn handle(&self, event: FetchEvent) -> Interception {
        let FetchEvent {
            request,
            client,
            preload,
        } = event;

        let Some(worker) = self.active().await else {
            return Interception::Bypass {
                request,
                reason: BypassReason::NoActiveWorker,
            };
        };

        if request.is_navigation() {
            if let Some(client) = client {
                self.clients.control(client, worker.version());
            }
        } else if !client.is_some_and(|id| self.clients.is_controlled_by(id, worker.version())) {
            worker.engine().stats().record_bypass();
            return Interception::Bypass {
                request,
                reason: BypassReason::Uncontrolled,
            };
        }

        worker.engine().handle(&request, preload).await
    }

    /// Like `handle`, but performs bypassed requests natively
    ///
    /// # Errors
    ///
    /// Only bypassed requests can fail; intercepted ones always resolve to
    /// a response, synthesized offline if need be.
    pub async fn respond(&self, event: FetchEvent) -> Result<HttpResponse> {
        match self.handle(event).await {
            Interception::Respond(served) => Ok(served.response),
            Interception::Bypass { request, .. } => {
                self.fetcher.fetch(&request, AbortSignal::never()).await
            }
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("store", &self.store)
            .field("clients", &self.clients.len())
            .finish_non_exhaustive()
    }
}
