use super::{ResponseSource, Served, StrategyEngine};
use crate::cache::{NamespaceHandle, RequestId};
use crate::fetch::AbortSignal;
use crate::http::{HttpResponse, InterceptedRequest};

impl StrategyEngine {
    /// Serve a stored entry without touching the network; on a miss fetch,
    /// store if eligible, and serve the fetched response
    pub(super) async fn cache_first(
        &self,
        request: &InterceptedRequest,
        id: &RequestId,
        namespace: &NamespaceHandle,
        max_entries: Option<usize>,
    ) -> Served {
        if let Some(cached) = self.lookup(namespace, id).await {
            return Served::new(cached, ResponseSource::Cache);
        }

        match self.fetch(request, AbortSignal::never()).await {
            Ok(response) => {
                self.store_if_eligible(namespace, id, &response, max_entries)
                    .await;
                Served::new(response, ResponseSource::Network)
            }
            Err(_) => self.offline(HttpResponse::offline_text()),
        }
    }
}
