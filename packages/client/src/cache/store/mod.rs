//! Cache store service
//!
//! The store is split the same way as the rest of the cache layer:
//!
//! - `core`: `CacheStore` service and `NamespaceHandle` construction
//! - `operations`: lookup, put, delete and key listing on a namespace
//! - `eviction`: oldest-first trimming of bounded namespaces
//!
//! Writes (put, delete, trim, namespace deletion) on one namespace are
//! serialised by a per-namespace async mutex. Reads never take it.

pub mod core;
pub mod eviction;
pub mod operations;

pub use core::{CacheStore, NamespaceHandle};
