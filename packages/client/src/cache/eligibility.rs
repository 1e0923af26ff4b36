//! Eligibility policy: which responses may be persisted
//!
//! The rules run in order and all must pass. `no-store` and `private` are
//! origin-asserted confidentiality signals and always win over any local
//! routing decision.

use std::fmt;

use http::StatusCode;

use crate::http::{HttpResponse, ResponseKind};

/// Why a response was not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    Missing,
    Status(StatusCode),
    Opaque,
    ErrorResponse,
    NoStore,
    Private,
    /// A `Cache-Control` value that is not plain ASCII
    MalformedCacheControl,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no response"),
            Self::Status(status) => write!(f, "status {status}"),
            Self::Opaque => f.write_str("opaque response"),
            Self::ErrorResponse => f.write_str("error response"),
            Self::NoStore => f.write_str("cache-control no-store"),
            Self::Private => f.write_str("cache-control private"),
            Self::MalformedCacheControl => f.write_str("unparseable cache-control"),
        }
    }
}

/// Outcome of the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Cacheable,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    #[must_use]
    pub fn is_cacheable(self) -> bool {
        matches!(self, Self::Cacheable)
    }
}

/// Evaluate the policy for a response
#[must_use]
pub fn evaluate(response: &HttpResponse) -> Eligibility {
    if response.status != StatusCode::OK {
        return Eligibility::Ineligible(IneligibleReason::Status(response.status));
    }

    match response.kind {
        ResponseKind::Opaque => return Eligibility::Ineligible(IneligibleReason::Opaque),
        ResponseKind::Error => return Eligibility::Ineligible(IneligibleReason::ErrorResponse),
        ResponseKind::Basic | ResponseKind::Cors => {}
    }

    if let Some(cache_control) = response.cache_control() {
        for directive in cache_control.split(',') {
            let name = directive
                .split('=')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            match name.as_str() {
                "no-store" => return Eligibility::Ineligible(IneligibleReason::NoStore),
                "private" => return Eligibility::Ineligible(IneligibleReason::Private),
                _ => {}
            }
        }
    }

    if response.has_malformed_cache_control() {
        return Eligibility::Ineligible(IneligibleReason::MalformedCacheControl);
    }

    Eligibility::Cacheable
}

/// Predicate form of [`evaluate`]; a missing response is never cacheable
#[must_use]
pub fn is_cacheable(response: Option<&HttpResponse>) -> bool {
    response.is_some_and(|r| evaluate(r).is_cacheable())
}

/// Like [`evaluate`] but accepting a missing response
#[must_use]
pub fn evaluate_optional(response: Option<&HttpResponse>) -> Eligibility {
    response.map_or(
        Eligibility::Ineligible(IneligibleReason::Missing),
        evaluate,
    )
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use http::header::CACHE_CONTROL;

    use super::*;

    fn ok() -> HttpResponse {
        HttpResponse::ok("body")
    }

    fn with_cache_control(value: &'static str) -> HttpResponse {
        ok().with_header(CACHE_CONTROL, HeaderValue::from_static(value))
    }

    #[test]
    fn plain_200_is_cacheable() {
        assert!(is_cacheable(Some(&ok())));
        assert!(is_cacheable(Some(&ok().with_kind(ResponseKind::Cors))));
        assert!(is_cacheable(Some(&with_cache_control("public, max-age=60"))));
    }

    #[test]
    fn missing_response_is_rejected() {
        assert!(!is_cacheable(None));
        assert_eq!(
            evaluate_optional(None),
            Eligibility::Ineligible(IneligibleReason::Missing)
        );
    }

    #[test]
    fn any_status_other_than_200_is_rejected() {
        for status in [
            StatusCode::NO_CONTENT,
            StatusCode::PARTIAL_CONTENT,
            StatusCode::MOVED_PERMANENTLY,
            StatusCode::NOT_MODIFIED,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let response = ok().with_status(status);
            assert_eq!(
                evaluate(&response),
                Eligibility::Ineligible(IneligibleReason::Status(status)),
                "status {status}"
            );
        }
    }

    #[test]
    fn opaque_and_error_kinds_are_rejected() {
        assert!(!is_cacheable(Some(&ok().with_kind(ResponseKind::Opaque))));
        assert!(!is_cacheable(Some(&ok().with_kind(ResponseKind::Error))));
    }

    #[test]
    fn confidentiality_directives_are_rejected() {
        assert_eq!(
            evaluate(&with_cache_control("no-store")),
            Eligibility::Ineligible(IneligibleReason::NoStore)
        );
        assert_eq!(
            evaluate(&with_cache_control("max-age=60, Private")),
            Eligibility::Ineligible(IneligibleReason::Private)
        );
        assert_eq!(
            evaluate(&with_cache_control("private=\"set-cookie\"")),
            Eligibility::Ineligible(IneligibleReason::Private)
        );
    }

    #[test]
    fn directives_split_across_header_lines_are_seen() {
        let response = ok()
            .with_header(CACHE_CONTROL, HeaderValue::from_static("max-age=60"))
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        assert!(!is_cacheable(Some(&response)));
    }

    #[test]
    fn no_cache_alone_does_not_block_storage() {
        assert!(is_cacheable(Some(&with_cache_control("no-cache"))));
    }

    #[test]
    fn non_ascii_cache_control_still_sees_no_store() {
        let value = HeaderValue::from_bytes(b"no-store, x=\"caf\xe9\"").expect("obs-text is allowed");
        let response = ok().with_header(CACHE_CONTROL, value);
        assert_eq!(
            evaluate(&response),
            Eligibility::Ineligible(IneligibleReason::NoStore)
        );
    }

    #[test]
    fn unparseable_cache_control_is_rejected() {
        let value = HeaderValue::from_bytes(b"max-age=60, x=\"caf\xe9\"").expect("obs-text is allowed");
        let response = ok().with_header(CACHE_CONTROL, value);
        assert_eq!(
            evaluate(&response),
            Eligibility::Ineligible(IneligibleReason::MalformedCacheControl)
        );
    }
}
