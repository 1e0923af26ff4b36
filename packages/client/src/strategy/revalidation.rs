//! Per-key de-duplication of background revalidations
//!
//! At most one revalidation per request identity is in flight. Later
//! requests for the same key join it instead of starting another fetch.
//! Each revalidation runs on its own task, so callers that stop listening
//! never cancel it; the entry is removed when the task settles.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::cache::RequestId;
use crate::error::Result;
use crate::http::HttpResponse;

/// Result every joiner of a revalidation observes
pub type RevalidationResult = Result<HttpResponse>;

/// Cloneable handle on an in-flight revalidation
pub type PendingRevalidation = Shared<BoxFuture<'static, RevalidationResult>>;

/// Registry of in-flight revalidations keyed by request identity
#[derive(Clone, Default)]
pub struct RevalidationRegistry {
    inflight: Arc<DashMap<RequestId, PendingRevalidation>>,
}

impl RevalidationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the revalidation for `id`, or start one with `start`
    ///
    /// Returns the shared handle and whether this call started it. Must be
    /// called from within a tokio runtime.
    pub fn join_or_start<F>(&self, id: &RequestId, start: F) -> (PendingRevalidation, bool)
    where
        F: FnOnce() -> BoxFuture<'static, RevalidationResult>,
    {
        let pending = match self.inflight.entry(id.clone()) {
            Entry::Occupied(existing) => return (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                let registry = Arc::clone(&self.inflight);
                let key = id.clone();
                let work = start();
                let pending = async move {
                    let result = work.await;
                    registry.remove(&key);
                    result
                }
                .boxed()
                .shared();
                slot.insert(pending.clone());
                pending
            }
        };

        tokio::spawn(pending.clone());
        (pending, true)
    }

    /// Number of revalidations currently in flight
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    #[must_use]
    pub fn is_in_flight(&self, id: &RequestId) -> bool {
        self.inflight.contains_key(id)
    }
}

impl fmt::Debug for RevalidationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevalidationRegistry")
            .field("in_flight", &self.inflight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn id() -> RequestId {
        RequestId::for_url(&Url::parse("http://localhost/app.js").expect("valid url"))
    }

    #[tokio::test(start_paused = true)]
    async fn second_caller_joins_first_revalidation() {
        let registry = RevalidationRegistry::new();
        let started = Arc::new(AtomicUsize::new(0));

        let start = |counter: Arc<AtomicUsize>| {
            move || {
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Ok(HttpResponse::ok("fresh"))
                }
                .boxed()
            }
        };

        let (first, first_started) = registry.join_or_start(&id(), start(Arc::clone(&started)));
        let (second, second_started) = registry.join_or_start(&id(), start(Arc::clone(&started)));

        assert!(first_started);
        assert!(!second_started);
        assert_eq!(registry.in_flight(), 1);

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.expect("fetch ok").body, "fresh");
        assert_eq!(b.expect("fetch ok").body, "fresh");
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_revalidation_is_removed() {
        let registry = RevalidationRegistry::new();
        let (pending, _) =
            registry.join_or_start(&id(), || async { Ok(HttpResponse::ok("x")) }.boxed());

        let _ = pending.await;
        tokio::task::yield_now().await;

        assert!(!registry.is_in_flight(&id()));
        assert_eq!(registry.in_flight(), 0);
    }
}
