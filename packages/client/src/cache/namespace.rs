//! Versioned namespace naming
//!
//! A namespace name is `"{kind}-{version}"`. Versions may not contain `-`,
//! so names of different versions never collide.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical cache bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// Bootstrap assets and navigations; pre-warmed at install, never trimmed
    Static,
    /// Subresources served stale-while-revalidate
    Runtime,
    /// API responses
    Api,
}

impl NamespaceKind {
    pub const ALL: [NamespaceKind; 3] = [Self::Static, Self::Runtime, Self::Api];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Runtime => "runtime",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespace kind bound to a deployment version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName {
    kind: NamespaceKind,
    version: String,
}

impl NamespaceName {
    #[must_use]
    pub fn new(kind: NamespaceKind, version: impl Into<String>) -> Self {
        Self {
            kind,
            version: version.into(),
        }
    }

    /// The exact set of names that are live for `version`
    #[must_use]
    pub fn live_set(version: &str) -> Vec<String> {
        NamespaceKind::ALL
            .into_iter()
            .map(|kind| Self::new(kind, version).to_string())
            .collect()
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.version)
    }
}
