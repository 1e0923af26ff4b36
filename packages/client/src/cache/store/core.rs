//! Core `CacheStore` service and namespace handles

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::super::backend::{MemoryBackend, StorageBackend};
use super::super::namespace::NamespaceName;
use crate::error::Result;
use crate::telemetry::CacheStats;

/// Shared, injectable cache store
///
/// Cloning is cheap; every clone talks to the same backend, write locks and
/// statistics.
#[derive(Clone)]
pub struct CacheStore {
    pub(super) backend: Arc<dyn StorageBackend>,
    pub(super) write_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    pub(super) stats: Arc<CacheStats>,
}

impl CacheStore {
    /// Create a store over the given backend
    pub fn new<B>(backend: B) -> Self
    where
        B: StorageBackend + 'static,
    {
        Self::from_arc(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            write_locks: Arc::new(DashMap::new()),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Create an in-memory store
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Statistics shared by every user of this store
    #[must_use]
    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    /// Open a namespace handle
    ///
    /// Opening never creates anything; the namespace comes into existence on
    /// its first write.
    #[must_use]
    pub fn open(&self, name: &NamespaceName) -> NamespaceHandle {
        self.open_raw(&name.to_string())
    }

    pub(crate) fn open_raw(&self, name: &str) -> NamespaceHandle {
        NamespaceHandle {
            name: name.to_string(),
            backend: Arc::clone(&self.backend),
            lock: self.write_lock(name),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Names of every namespace currently holding entries
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend cannot be listed.
    pub async fn namespaces(&self) -> Result<Vec<String>> {
        self.backend.namespaces().await
    }

    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend cannot be queried.
    pub async fn has_namespace(&self, name: &str) -> Result<bool> {
        self.backend.contains_namespace(name).await
    }

    /// Delete a whole namespace, serialised with writes to it
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend fails to delete it.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;
        let deleted = self.backend.drop_namespace(name).await?;
        if deleted {
            tracing::debug!(target: "cachegate::store", namespace = name, "Namespace deleted");
        }
        Ok(deleted)
    }

    fn write_lock(&self, name: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.write_locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend)
            .field("namespaces_locked", &self.write_locks.len())
            .finish()
    }
}

/// Handle to one namespace of a [`CacheStore`]
#[derive(Clone)]
pub struct NamespaceHandle {
    pub(super) name: String,
    pub(super) backend: Arc<dyn StorageBackend>,
    pub(super) lock: Arc<Mutex<()>>,
    pub(super) stats: Arc<CacheStats>,
}

impl NamespaceHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NamespaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceHandle")
            .field("name", &self.name)
            .finish()
    }
}
