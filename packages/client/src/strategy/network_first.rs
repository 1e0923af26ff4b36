//! Network-first with a deadline
//!
//! The fetch races a timer. When the timer wins the fetch is aborted and
//! dropped, the timeout is recorded, and the stored entry (or a synthesized
//! offline response) is served instead. Cache fallback only ever happens
//! after the network attempt has failed or timed out.

use std::time::Duration;

use super::{ResponseSource, Served, StrategyEngine};
use crate::cache::{NamespaceHandle, RequestId};
use crate::error;
use crate::fetch::AbortController;
use crate::http::{HttpResponse, InterceptedRequest};

impl StrategyEngine {
    pub(super) async fn network_first(
        &self,
        request: &InterceptedRequest,
        id: &RequestId,
        namespace: &NamespaceHandle,
        max_entries: Option<usize>,
        timeout: Duration,
    ) -> Served {
        let controller = AbortController::new();

        let outcome = tokio::select! {
            result = self.fetch(request, controller.signal()) => result,
            () = tokio::time::sleep(timeout) => {
                controller.abort();
                self.stats().record_timeout();
                tracing::warn!(
                    target: "cachegate::strategy",
                    url = %request.url(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Network deadline exceeded, aborting fetch"
                );
                Err(error::timeout(request.url().clone()))
            }
        };

        match outcome {
            Ok(response) => {
                self.store_if_eligible(namespace, id, &response, max_entries)
                    .await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(
                    target: "cachegate::strategy",
                    key = %id,
                    error = %e,
                    "Falling back to cache"
                );
                match self.lookup(namespace, id).await {
                    Some(cached) => Served::new(cached, ResponseSource::Cache),
                    None => self.offline(HttpResponse::offline_json()),
                }
            }
        }
    }
}
