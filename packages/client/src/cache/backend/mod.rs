//! Persistence backends behind the cache store
//!
//! A backend only stores and lists entries. Locking, statistics and
//! eviction live in the `store` layer above it.

use std::fmt;

use async_trait::async_trait;

use super::{cache_entry::CacheEntry, cache_key::RequestId};
use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Storage seam for namespaced entries
///
/// Every failure must be reported as `Kind::StoreUnavailable`; callers treat
/// it as a cache miss or a skipped write.
#[async_trait]
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Fetch the entry stored for `id`
    async fn lookup(&self, namespace: &str, id: &RequestId) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite `id`, stamping a fresh insertion sequence
    async fn insert(&self, namespace: &str, id: &RequestId, entry: CacheEntry) -> Result<u64>;

    /// Remove `id`, returning whether it was present
    async fn remove(&self, namespace: &str, id: &RequestId) -> Result<bool>;

    /// Keys ordered by insertion sequence, oldest first
    async fn keys(&self, namespace: &str) -> Result<Vec<RequestId>>;

    /// Names of all existing namespaces
    async fn namespaces(&self) -> Result<Vec<String>>;

    async fn contains_namespace(&self, namespace: &str) -> Result<bool>;

    /// Remove a namespace and everything in it
    async fn drop_namespace(&self, namespace: &str) -> Result<bool>;
}
