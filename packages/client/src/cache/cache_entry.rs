//! Stored response entries

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};

use crate::http::{HttpResponse, ResponseKind};

/// A response persisted in a namespace
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Insertion sequence, assigned by the backend on every put
    pub sequence: u64,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Snapshot a response for storage
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            sequence: 0,
            stored_at: Utc::now(),
        }
    }

    /// Replay the stored response
    #[must_use]
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            kind: ResponseKind::Basic,
        }
    }

    /// Rough size estimate used for logging
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        (self.body.len() + headers) as u64
    }
}
