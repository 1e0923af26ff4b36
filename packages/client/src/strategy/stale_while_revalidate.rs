//! Stale-while-revalidate
//!
//! A stored entry is served immediately while a background fetch refreshes
//! it. Concurrent requests for the same key share one background fetch.

use futures::FutureExt;

use super::revalidation::PendingRevalidation;
use super::{ResponseSource, Served, StrategyEngine};
use crate::cache::{NamespaceHandle, RequestId};
use crate::fetch::AbortSignal;
use crate::http::{HttpResponse, InterceptedRequest};

impl StrategyEngine {
    pub(super) async fn stale_while_revalidate(
        &self,
        request: &InterceptedRequest,
        id: &RequestId,
        namespace: &NamespaceHandle,
        max_entries: Option<usize>,
    ) -> Served {
        let cached = self.lookup(namespace, id).await;
        let pending = self.revalidate(request, id, namespace, max_entries);

        if let Some(cached) = cached {
            return Served::new(cached, ResponseSource::Cache);
        }

        match pending.await {
            Ok(response) => Served::new(response, ResponseSource::Network),
            Err(_) => self.offline(HttpResponse::offline_text()),
        }
    }

    /// Start or join the background refresh for `id`
    fn revalidate(
        &self,
        request: &InterceptedRequest,
        id: &RequestId,
        namespace: &NamespaceHandle,
        max_entries: Option<usize>,
    ) -> PendingRevalidation {
        let engine = self.clone();
        let request = request.clone();
        let key = id.clone();
        let namespace = namespace.clone();

        let (pending, started) = self.revalidations.join_or_start(id, move || {
            async move {
                let result = engine.fetch(&request, AbortSignal::never()).await;
                if let Ok(ref response) = result {
                    engine
                        .store_if_eligible(&namespace, &key, response, max_entries)
                        .await;
                }
                result
            }
            .boxed()
        });

        if started {
            self.stats().record_revalidation_started();
            tracing::debug!(target: "cachegate::strategy", key = %id, "Revalidation started");
        } else {
            self.stats().record_revalidation_joined();
            tracing::trace!(target: "cachegate::strategy", key = %id, "Joined in-flight revalidation");
        }

        pending
    }
}
