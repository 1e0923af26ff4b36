//! Fetch/serve strategies
//!
//! - `engine`: `StrategyEngine`, shared lookup/store helpers and dispatch
//! - `cache_first`, `network_first`, `stale_while_revalidate`, `navigation`:
//!   one algorithm each
//! - `revalidation`: per-key de-duplication of background refreshes

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::HttpResponse;

pub mod cache_first;
pub mod engine;
pub mod navigation;
pub mod network_first;
pub mod revalidation;
pub mod stale_while_revalidate;

pub use engine::StrategyEngine;
pub use revalidation::RevalidationRegistry;

/// Fetch/serve algorithm bound to a route class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Serve from cache; fetch and store only on a miss
    CacheFirst,
    /// Race the network against a deadline, falling back to cache
    NetworkFirstTimeout(#[serde(with = "crate::config::duration_ms")] Duration),
    /// Serve cache immediately and refresh it in the background
    StaleWhileRevalidate,
    /// Prefer a platform preloaded response, then network, then offline document
    NavigationPreload,
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Preload,
    Offline,
}

/// The single response a caller observes for an intercepted request
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub response: HttpResponse,
    pub source: ResponseSource,
}

impl Served {
    #[must_use]
    pub fn new(response: HttpResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.source == ResponseSource::Offline
    }
}
