//! Response descriptor shared by the fetch boundary and the cache store

use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};

/// Body of the JSON offline response
pub const OFFLINE_JSON_BODY: &str = r#"{"error":"Offline"}"#;

/// Body of the plain-text offline placeholder
pub const OFFLINE_TEXT_BODY: &str = "Offline";

/// How the platform classified the response
///
/// Mirrors the response types a browser exposes: `Opaque` responses come
/// from cross-origin no-cors fetches whose body and status are hidden,
/// `Error` is a network error surfaced as a response object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Basic,
    Cors,
    Opaque,
    Error,
}

/// A fully materialized HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    /// 200 OK with the given body and no headers
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Synthesized response for API requests that found neither network nor cache
    #[must_use]
    pub fn offline_json() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(StatusCode::SERVICE_UNAVAILABLE, headers, OFFLINE_JSON_BODY)
    }

    /// Minimal placeholder when not even the offline document is cached
    #[must_use]
    pub fn offline_text() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self::new(StatusCode::SERVICE_UNAVAILABLE, headers, OFFLINE_TEXT_BODY)
    }

    /// All `Cache-Control` values joined with commas
    ///
    /// Bytes outside visible ASCII are replaced, never dropped, so every
    /// directive on every header line is seen.
    #[must_use]
    pub fn cache_control(&self) -> Option<String> {
        let values: Vec<_> = self
            .headers
            .get_all(CACHE_CONTROL)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    /// Whether any `Cache-Control` value is not plain visible ASCII
    #[must_use]
    pub fn has_malformed_cache_control(&self) -> bool {
        self.headers
            .get_all(CACHE_CONTROL)
            .iter()
            .any(|v| v.to_str().is_err())
    }
}
