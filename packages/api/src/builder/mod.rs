//! Fluent construction of a `CacheGate`
//!
//! - `core`: `CacheGateBuilder` state and `build`
//! - `routes`: per-route strategy and namespace ceiling methods
//! - `storage`: choice of backend

pub mod core;
pub mod routes;
pub mod storage;

pub use core::CacheGateBuilder;
pub use storage::StoreChoice;
