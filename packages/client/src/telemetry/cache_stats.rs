//! Cache and interception statistics
//!
//! Provides `CacheStats` for tracking hits, misses, stores, evictions and
//! the fallbacks taken by strategies, with atomic counters shared by every
//! worker using the same store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for the interception engine
#[derive(Debug)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: AtomicU64,
    /// Number of cache misses
    pub misses: AtomicU64,
    /// Responses written to a namespace
    pub stores: AtomicU64,
    /// Responses skipped by the eligibility policy
    pub ineligible: AtomicU64,
    /// Entries removed by trimming
    pub evictions: AtomicU64,
    /// Store failures absorbed as misses or skipped writes
    pub store_errors: AtomicU64,
    /// Fetches that failed without a response
    pub network_failures: AtomicU64,
    /// Fetches cancelled at their deadline
    pub timeouts: AtomicU64,
    /// Synthesized offline responses served
    pub offline_served: AtomicU64,
    /// Requests passed through untouched
    pub bypassed: AtomicU64,
    /// Navigation preload responses served
    pub preload_served: AtomicU64,
    /// Background revalidations started
    pub revalidations_started: AtomicU64,
    /// Requests that joined an in-flight revalidation
    pub revalidations_joined: AtomicU64,
    /// Statistics creation time
    pub created_at: Instant,
}

impl CacheStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ineligible(&self) {
        self.ineligible.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_offline(&self) {
        self.offline_served.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_bypass(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_preload(&self) {
        self.preload_served.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_revalidation_started(&self) {
        self.revalidations_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_revalidation_joined(&self) {
        self.revalidations_joined.fetch_add(1, Ordering::Relaxed);
    }

    /// Get hit ratio
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64) / (total as f64)
        }
    }

    /// Get statistics age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            ineligible: self.ineligible.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            offline_served: self.offline_served.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            preload_served: self.preload_served.load(Ordering::Relaxed),
            revalidations_started: self.revalidations_started.load(Ordering::Relaxed),
            revalidations_joined: self.revalidations_joined.load(Ordering::Relaxed),
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            ineligible: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
            network_failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            offline_served: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
            preload_served: AtomicU64::new(0),
            revalidations_started: AtomicU64::new(0),
            revalidations_joined: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }
}

/// Plain copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub ineligible: u64,
    pub evictions: u64,
    pub store_errors: u64,
    pub network_failures: u64,
    pub timeouts: u64,
    pub offline_served: u64,
    pub bypassed: u64,
    pub preload_served: u64,
    pub revalidations_started: u64,
    pub revalidations_joined: u64,
}
