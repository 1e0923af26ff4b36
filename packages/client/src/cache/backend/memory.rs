//! In-memory backend

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use hashbrown::HashMap;

use super::super::{cache_entry::CacheEntry, cache_key::RequestId};
use super::StorageBackend;
use crate::error::Result;

/// Process-local backend; entries vanish with the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespaces: DashMap<String, MemoryNamespace>,
    sequence: AtomicU64,
}

#[derive(Debug, Default)]
struct MemoryNamespace {
    entries: HashMap<RequestId, CacheEntry>,
    /// sequence -> key, oldest first
    order: BTreeMap<u64, RequestId>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn lookup(&self, namespace: &str, id: &RequestId) -> Result<Option<CacheEntry>> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.entries.get(id).cloned()))
    }

    async fn insert(&self, namespace: &str, id: &RequestId, mut entry: CacheEntry) -> Result<u64> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        entry.sequence = sequence;

        let mut ns = self.namespaces.entry(namespace.to_string()).or_default();
        if let Some(previous) = ns.entries.insert(id.clone(), entry) {
            ns.order.remove(&previous.sequence);
        }
        ns.order.insert(sequence, id.clone());

        Ok(sequence)
    }

    async fn remove(&self, namespace: &str, id: &RequestId) -> Result<bool> {
        let Some(mut ns) = self.namespaces.get_mut(namespace) else {
            return Ok(false);
        };
        match ns.entries.remove(id) {
            Some(previous) => {
                ns.order.remove(&previous.sequence);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<RequestId>> {
        Ok(self
            .namespaces
            .get(namespace)
            .map(|ns| ns.order.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.namespaces.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn contains_namespace(&self, namespace: &str) -> Result<bool> {
        Ok(self.namespaces.contains_key(namespace))
    }

    async fn drop_namespace(&self, namespace: &str) -> Result<bool> {
        Ok(self.namespaces.remove(namespace).is_some())
    }
}
