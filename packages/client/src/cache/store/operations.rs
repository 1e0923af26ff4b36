//! Namespace read and write operations

use std::sync::atomic::{AtomicBool, Ordering};

use super::super::{cache_entry::CacheEntry, cache_key::RequestId};
use super::core::NamespaceHandle;
use crate::error::Result;

impl NamespaceHandle {
    /// Look up the stored entry for `id` (the `match` operation)
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend read fails.
    pub async fn lookup(&self, id: &RequestId) -> Result<Option<CacheEntry>> {
        self.backend.lookup(&self.name, id).await
    }

    /// Store `entry` under `id`
    ///
    /// Overwriting an existing key replaces it and moves it to the newest
    /// position in insertion order. Returns the assigned sequence number.
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend write fails.
    pub async fn put(&self, id: &RequestId, entry: CacheEntry) -> Result<u64> {
        let _guard = self.lock.lock().await;
        self.put_locked(id, entry).await
    }

    /// Store `entry` and, when `max_entries` is set, trim under the same lock
    ///
    /// Returns the number of entries evicted.
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the write or the trim fails.
    pub async fn put_bounded(
        &self,
        id: &RequestId,
        entry: CacheEntry,
        max_entries: Option<usize>,
    ) -> Result<usize> {
        let unhalted = AtomicBool::new(false);
        let trimmed = self
            .put_bounded_unless(id, entry, max_entries, &unhalted)
            .await?;
        Ok(trimmed.unwrap_or_default())
    }

    /// Like [`put_bounded`](Self::put_bounded), skipped when `halted` is set
    ///
    /// The flag is read after the write lock is taken. Returns `None` when
    /// the write was skipped.
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the write or the trim fails.
    pub async fn put_bounded_unless(
        &self,
        id: &RequestId,
        entry: CacheEntry,
        max_entries: Option<usize>,
        halted: &AtomicBool,
    ) -> Result<Option<usize>> {
        let _guard = self.lock.lock().await;
        if halted.load(Ordering::Acquire) {
            return Ok(None);
        }
        self.put_locked(id, entry).await?;
        match max_entries {
            Some(max) => self.trim_locked(max).await.map(Some),
            None => Ok(Some(0)),
        }
    }

    /// Delete the entry for `id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend delete fails.
    pub async fn delete(&self, id: &RequestId) -> Result<bool> {
        let _guard = self.lock.lock().await;
        self.backend.remove(&self.name, id).await
    }

    /// Keys in insertion order, oldest first
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend cannot be listed.
    pub async fn keys(&self) -> Result<Vec<RequestId>> {
        self.backend.keys(&self.name).await
    }

    /// Number of stored entries
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the backend cannot be listed.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.keys().await?.len())
    }

    async fn put_locked(&self, id: &RequestId, entry: CacheEntry) -> Result<u64> {
        let size = entry.size_bytes();
        let sequence = self.backend.insert(&self.name, id, entry).await?;
        self.stats.record_store();
        tracing::debug!(
            target: "cachegate::store",
            namespace = %self.name,
            key = %id,
            sequence,
            size_bytes = size,
            "Entry stored"
        );
        Ok(sequence)
    }
}
