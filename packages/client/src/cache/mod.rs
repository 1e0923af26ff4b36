//! Namespaced, versioned response cache
//!
//! - `cache_key`: normalized request identity
//! - `cache_entry`: stored response snapshot with insertion sequence
//! - `namespace`: `{kind}-{version}` naming
//! - `eligibility`: which responses may be persisted
//! - `store`: the shared `CacheStore` service with per-namespace write locks
//! - `backend`: memory and file persistence

pub mod backend;
pub mod cache_entry;
pub mod cache_key;
pub mod eligibility;
pub mod namespace;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use cache_entry::CacheEntry;
pub use cache_key::RequestId;
pub use eligibility::{Eligibility, IneligibleReason, evaluate, is_cacheable};
pub use namespace::{NamespaceKind, NamespaceName};
pub use store::{CacheStore, NamespaceHandle};
