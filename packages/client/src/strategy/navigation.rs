//! Navigation handling
//!
//! Order of preference: the platform's preloaded response, a network fetch
//! (stored into the static namespace when eligible), the cached offline
//! document, and finally a plain-text offline placeholder.

use super::{ResponseSource, Served, StrategyEngine};
use crate::cache::{NamespaceHandle, NamespaceKind, RequestId};
use crate::fetch::AbortSignal;
use crate::http::{HttpResponse, InterceptedRequest};

impl StrategyEngine {
    pub(super) async fn navigation(
        &self,
        request: &InterceptedRequest,
        id: &RequestId,
        namespace: &NamespaceHandle,
        max_entries: Option<usize>,
        preload: Option<HttpResponse>,
    ) -> Served {
        if let Some(preloaded) = preload {
            self.stats().record_preload();
            tracing::debug!(target: "cachegate::strategy", key = %id, "Serving preloaded navigation");
            return Served::new(preloaded, ResponseSource::Preload);
        }

        match self.fetch(request, AbortSignal::never()).await {
            Ok(response) => {
                self.store_if_eligible(namespace, id, &response, max_entries)
                    .await;
                Served::new(response, ResponseSource::Network)
            }
            Err(_) => match self.offline_document().await {
                Some(document) => {
                    self.stats().record_offline();
                    Served::new(document, ResponseSource::Offline)
                }
                None => self.offline(HttpResponse::offline_text()),
            },
        }
    }

    /// The configured offline document from the static namespace
    async fn offline_document(&self) -> Option<HttpResponse> {
        let url = match self.config.resolve(&self.config.offline_document) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(target: "cachegate::strategy", error = %e, "Offline document unresolvable");
                return None;
            }
        };

        let statics = self.store.open(&self.config.namespace(NamespaceKind::Static));
        self.lookup(&statics, &RequestId::for_url(&url)).await
    }
}
