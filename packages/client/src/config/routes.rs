//! Route class to strategy bindings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::NamespaceKind;
use crate::strategy::Strategy;

/// Default API deadline
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_millis(3000);

/// A strategy and the namespace it reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBinding {
    pub strategy: Strategy,
    pub namespace: NamespaceKind,
}

impl RouteBinding {
    #[must_use]
    pub fn new(strategy: Strategy, namespace: NamespaceKind) -> Self {
        Self { strategy, namespace }
    }
}

/// Bindings for every cacheable route class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteBindings {
    pub api: RouteBinding,
    pub navigation: RouteBinding,
    pub assets: RouteBinding,
}

impl Default for RouteBindings {
    fn default() -> Self {
        Self {
            api: RouteBinding::new(
                Strategy::NetworkFirstTimeout(DEFAULT_NETWORK_TIMEOUT),
                NamespaceKind::Api,
            ),
            navigation: RouteBinding::new(Strategy::NavigationPreload, NamespaceKind::Static),
            assets: RouteBinding::new(Strategy::StaleWhileRevalidate, NamespaceKind::Runtime),
        }
    }
}

impl RouteBindings {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RouteBinding)> {
        [
            ("api", &self.api),
            ("navigation", &self.navigation),
            ("assets", &self.assets),
        ]
        .into_iter()
    }
}
