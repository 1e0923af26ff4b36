//! Route classification
//!
//! A pure function from request to route class, evaluated before any cache
//! or network access. First match wins:
//!
//! 1. non-http(s) scheme or non-GET method: bypass
//! 2. cross-origin: bypass
//! 3. sensitive path prefix: bypass
//! 4. API prefix: `Api`
//! 5. navigation: `Navigation`
//! 6. everything else: `Static`

use std::fmt;

use http::Method;
use url::{Origin, Url};

use crate::config::{EngineConfig, RouteBinding};
use crate::http::InterceptedRequest;

/// Why a request was passed through untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassReason {
    Scheme(String),
    Method(Method),
    CrossOrigin,
    Sensitive(String),
    /// No version has been activated yet
    NoActiveWorker,
    /// The originating client is not controlled by the active version
    Uncontrolled,
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheme(scheme) => write!(f, "scheme {scheme}"),
            Self::Method(method) => write!(f, "method {method}"),
            Self::CrossOrigin => f.write_str("cross-origin"),
            Self::Sensitive(prefix) => write!(f, "sensitive prefix {prefix}"),
            Self::NoActiveWorker => f.write_str("no active worker"),
            Self::Uncontrolled => f.write_str("uncontrolled client"),
        }
    }
}

/// Route class of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClass {
    Excluded(BypassReason),
    Api,
    Navigation,
    Static,
}

/// Classification rules derived from configuration
#[derive(Debug, Clone)]
pub struct RouteRules {
    origin: Origin,
    sensitive_prefixes: Vec<String>,
    api_prefix: String,
}

impl RouteRules {
    #[must_use]
    pub fn new(origin: &Url, sensitive_prefixes: Vec<String>, api_prefix: impl Into<String>) -> Self {
        Self {
            origin: origin.origin(),
            sensitive_prefixes,
            api_prefix: api_prefix.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            &config.origin,
            config.sensitive_prefixes.clone(),
            config.api_prefix.clone(),
        )
    }

    /// Classify `request`
    #[must_use]
    pub fn classify(&self, request: &InterceptedRequest) -> RouteClass {
        let url = request.url();

        if !matches!(url.scheme(), "http" | "https") {
            return RouteClass::Excluded(BypassReason::Scheme(url.scheme().to_string()));
        }
        if request.method() != Method::GET {
            return RouteClass::Excluded(BypassReason::Method(request.method().clone()));
        }
        if url.origin() != self.origin {
            return RouteClass::Excluded(BypassReason::CrossOrigin);
        }

        let path = url.path();
        if let Some(prefix) = self
            .sensitive_prefixes
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
        {
            return RouteClass::Excluded(BypassReason::Sensitive(prefix.clone()));
        }

        if path.starts_with(&self.api_prefix) {
            RouteClass::Api
        } else if request.is_navigation() {
            RouteClass::Navigation
        } else {
            RouteClass::Static
        }
    }
}

impl RouteClass {
    /// Binding configured for this class; `None` for excluded requests
    #[must_use]
    pub fn binding(&self, config: &EngineConfig) -> Option<RouteBinding> {
        match self {
            Self::Excluded(_) => None,
            Self::Api => Some(config.routes.api),
            Self::Navigation => Some(config.routes.navigation),
            Self::Static => Some(config.routes.assets),
        }
    }
}
