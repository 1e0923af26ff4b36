//! Oldest-first trimming of bounded namespaces

use super::core::NamespaceHandle;
use crate::error::Result;

impl NamespaceHandle {
    /// Bound the namespace to `max_entries`, deleting the oldest entries
    ///
    /// Serialised with puts and deletes on the same namespace, so two
    /// concurrent trims never count the same deletion twice. Returns the
    /// number of entries removed; a no-op when already within bounds.
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if listing or deleting fails.
    pub async fn trim(&self, max_entries: usize) -> Result<usize> {
        let _guard = self.lock.lock().await;
        self.trim_locked(max_entries).await
    }

    pub(super) async fn trim_locked(&self, max_entries: usize) -> Result<usize> {
        let keys = self.backend.keys(&self.name).await?;
        if keys.len() <= max_entries {
            return Ok(0);
        }

        let excess = keys.len() - max_entries;
        let mut removed = 0;

        for key in keys.iter().take(excess) {
            if self.backend.remove(&self.name, key).await? {
                removed += 1;
            }
        }

        self.stats.record_evictions(removed);
        tracing::debug!(
            target: "cachegate::eviction",
            namespace = %self.name,
            removed,
            max_entries,
            "Namespace trimmed"
        );

        Ok(removed)
    }
}
