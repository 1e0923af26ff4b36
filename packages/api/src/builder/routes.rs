use std::time::Duration;

use cachegate_client::cache::NamespaceKind;
use cachegate_client::config::RouteBinding;
use cachegate_client::strategy::Strategy;

use crate::builder::core::CacheGateBuilder;

impl CacheGateBuilder {
    /// Deadline for network-first API requests
    #[must_use]
    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_network_timeout(timeout);
        self
    }

    #[must_use]
    pub fn api_route(mut self, strategy: Strategy, namespace: NamespaceKind) -> Self {
        self.config.routes.api = RouteBinding::new(strategy, namespace);
        self
    }

    #[must_use]
    pub fn navigation_route(mut self, strategy: Strategy, namespace: NamespaceKind) -> Self {
        self.config.routes.navigation = RouteBinding::new(strategy, namespace);
        self
    }

    #[must_use]
    pub fn asset_route(mut self, strategy: Strategy, namespace: NamespaceKind) -> Self {
        self.config.routes.assets = RouteBinding::new(strategy, namespace);
        self
    }

    /// Bound `kind` to at most `max` entries, oldest evicted first
    #[must_use]
    pub fn max_entries(mut self, kind: NamespaceKind, max: usize) -> Self {
        self.config = self.config.with_max_entries(kind, max);
        self
    }

    #[must_use]
    pub fn unbounded(mut self, kind: NamespaceKind) -> Self {
        self.config = self.config.unbounded(kind);
        self
    }
}
