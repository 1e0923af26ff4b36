//! Request identity used as the cache key
//!
//! Only GET requests are ever cached, so the identity is the absolute URL
//! with its fragment removed. Query strings are significant.

use std::fmt;

use http::Method;
use ring::digest::{SHA256, digest};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{self, Result};
use crate::http::InterceptedRequest;

/// Normalized identity of a cacheable request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId {
    url: String,
}

impl RequestId {
    /// Identity of a GET for `url`
    #[must_use]
    pub fn for_url(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { url: url.into() }
    }

    /// Identity of an intercepted request
    ///
    /// # Errors
    ///
    /// Returns `Kind::InvalidRequest` for any method other than GET.
    pub fn from_request(request: &InterceptedRequest) -> Result<Self> {
        if request.method() != Method::GET {
            return Err(error::invalid_request(format!(
                "method {} cannot be cached",
                request.method()
            ))
            .with_url(request.url().clone()));
        }
        Ok(Self::for_url(request.url()))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stable hex digest, used where the identity must become a file name
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(digest(&SHA256, self.to_string().as_bytes()))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid url")
    }

    #[test]
    fn fragment_is_not_part_of_identity() {
        let a = RequestId::for_url(&url("http://localhost/app.js#main"));
        let b = RequestId::for_url(&url("http://localhost/app.js"));
        assert_eq!(a, b);
        assert_eq!(a.digest_hex(), b.digest_hex());
    }

    #[test]
    fn query_is_part_of_identity() {
        let a = RequestId::for_url(&url("http://localhost/api/items?page=1"));
        let b = RequestId::for_url(&url("http://localhost/api/items?page=2"));
        assert_ne!(a, b);
    }

    #[test]
    fn non_get_requests_have_no_identity() {
        let request = InterceptedRequest::new(Method::POST, url("http://localhost/api/items"));
        let err = RequestId::from_request(&request).expect_err("POST must be rejected");
        assert_eq!(err.kind(), &crate::error::Kind::InvalidRequest);
    }
}
