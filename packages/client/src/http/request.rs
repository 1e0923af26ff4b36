//! Intercepted request descriptor
//!
//! The platform hands every outgoing request to the engine as an
//! `InterceptedRequest`. Only the method, URL, navigation flag and headers
//! matter here; bodies never take part in caching decisions.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// A request observed at the interception point
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptedRequest {
    method: Method,
    url: Url,
    navigate: bool,
    headers: HeaderMap,
}

impl InterceptedRequest {
    /// Create a request with an explicit method
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            navigate: false,
            headers: HeaderMap::new(),
        }
    }

    /// Create a GET subresource request
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a top-level navigation request
    #[must_use]
    pub fn navigation(url: Url) -> Self {
        Self {
            navigate: true,
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// True for top-level page loads
    #[must_use]
    pub fn is_navigation(&self) -> bool {
        self.navigate
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
