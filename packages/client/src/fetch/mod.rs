//! Outbound fetch boundary
//!
//! The engine never speaks a wire protocol itself; it delegates to a
//! `Fetcher`. Every fetch carries an `AbortSignal` so deadline-bound
//! strategies can cancel the underlying transfer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::{HttpResponse, InterceptedRequest};

pub mod abort;
pub mod http_fetcher;

pub use abort::{AbortController, AbortSignal};
pub use http_fetcher::HttpFetcher;

/// Network capability used by strategies and installation
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `request`, giving up with `Kind::Aborted` once `signal` fires
    ///
    /// Implementations report transport failures as
    /// `Kind::NetworkUnavailable`; HTTP error statuses are responses, not
    /// errors.
    async fn fetch(&self, request: &InterceptedRequest, signal: AbortSignal) -> Result<HttpResponse>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, request: &InterceptedRequest, signal: AbortSignal) -> Result<HttpResponse> {
        (**self).fetch(request, signal).await
    }
}
