//! Engine configuration structure, defaults and builder methods
//!
//! Defaults reproduce the production deployment: five bootstrap assets, three
//! sensitive API prefixes, a 3 s API deadline and a 100 entry ceiling on the
//! runtime and API namespaces.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use super::routes::{RouteBinding, RouteBindings};
use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
use crate::cache::{NamespaceKind, NamespaceName};
use crate::strategy::Strategy;

/// Static configuration of one deployed version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deployment version tag, part of every namespace name
    pub version: String,

    /// The origin whose requests are intercepted
    pub origin: Url,

    /// Paths pre-warmed into the static namespace at install
    pub bootstrap_assets: Vec<String>,

    /// Path prefixes that are never cached
    pub sensitive_prefixes: Vec<String>,

    /// Path prefix selecting the API binding
    pub api_prefix: String,

    /// Strategy and namespace per route class
    pub routes: RouteBindings,

    /// Entry ceilings for bounded namespaces
    ///
    /// When loaded, each kind given overrides its default and `null` removes
    /// the ceiling; kinds not mentioned keep their defaults.
    #[serde(deserialize_with = "merge_max_entries")]
    pub max_entries: BTreeMap<NamespaceKind, usize>,

    /// Document served to navigations when both network and cache fail
    pub offline_document: String,

    /// Activate a freshly installed version without waiting
    pub skip_waiting: bool,

    /// Enable navigation preload when the version activates
    pub navigation_preload: bool,
}

static DEFAULT_ORIGIN: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("default origin is a valid URL"));

fn default_max_entries() -> BTreeMap<NamespaceKind, usize> {
    BTreeMap::from([(NamespaceKind::Runtime, 100), (NamespaceKind::Api, 100)])
}

fn merge_max_entries<'de, D>(deserializer: D) -> Result<BTreeMap<NamespaceKind, usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<NamespaceKind, Option<usize>>::deserialize(deserializer)?;
    let mut merged = default_max_entries();
    for (kind, max) in overrides {
        match max {
            Some(max) => merged.insert(kind, max),
            None => merged.remove(&kind),
        };
    }
    Ok(merged)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "v6.0.0".to_string(),
            origin: DEFAULT_ORIGIN.clone(),
            bootstrap_assets: [
                "/",
                "/index.html",
                "/manifest.json",
                "/icon-192.png",
                "/icon-512.png",
            ]
            .map(String::from)
            .to_vec(),
            sensitive_prefixes: ["/api/auth", "/api/user/private", "/api/tokens"]
                .map(String::from)
                .to_vec(),
            api_prefix: "/api/".to_string(),
            routes: RouteBindings::default(),
            max_entries: default_max_entries(),
            offline_document: "/index.html".to_string(),
            skip_waiting: true,
            navigation_preload: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Load` on malformed JSON, or the first
    /// validation failure.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Load` if the file cannot be read or
    /// parsed, or the first validation failure.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_bootstrap_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bootstrap_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_sensitive_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteBindings) -> Self {
        self.routes = routes;
        self
    }

    /// Set the deadline of every network-first binding
    #[must_use]
    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        for binding in [
            &mut self.routes.api,
            &mut self.routes.navigation,
            &mut self.routes.assets,
        ] {
            if let Strategy::NetworkFirstTimeout(_) = binding.strategy {
                binding.strategy = Strategy::NetworkFirstTimeout(timeout);
            }
        }
        self
    }

    /// Bound `kind` to `max` entries
    #[must_use]
    pub fn with_max_entries(mut self, kind: NamespaceKind, max: usize) -> Self {
        self.max_entries.insert(kind, max);
        self
    }

    /// Leave `kind` unbounded
    #[must_use]
    pub fn unbounded(mut self, kind: NamespaceKind) -> Self {
        self.max_entries.remove(&kind);
        self
    }

    #[must_use]
    pub fn with_offline_document(mut self, path: impl Into<String>) -> Self {
        self.offline_document = path.into();
        self
    }

    #[must_use]
    pub fn with_skip_waiting(mut self, skip_waiting: bool) -> Self {
        self.skip_waiting = skip_waiting;
        self
    }

    #[must_use]
    pub fn with_navigation_preload(mut self, enabled: bool) -> Self {
        self.navigation_preload = enabled;
        self
    }

    /// The deadline of the API binding, when it is network-first
    #[must_use]
    pub fn network_timeout(&self) -> Option<Duration> {
        match self.routes.api.strategy {
            Strategy::NetworkFirstTimeout(timeout) => Some(timeout),
            _ => None,
        }
    }

    /// Versioned name of `kind` for this deployment
    #[must_use]
    pub fn namespace(&self, kind: NamespaceKind) -> NamespaceName {
        NamespaceName::new(kind, self.version.clone())
    }

    /// Ceiling for `kind`; the static namespace is always unbounded
    #[must_use]
    pub fn max_entries_for(&self, kind: NamespaceKind) -> Option<usize> {
        match kind {
            NamespaceKind::Static => None,
            _ => self.max_entries.get(&kind).copied(),
        }
    }

    /// Resolve a same-origin path to an absolute URL
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAsset` when the path leaves the origin.
    pub fn resolve(&self, path: &str) -> ConfigResult<Url> {
        ConfigValidator::resolve_same_origin(&self.origin, path)
    }

    fn validate_binding(name: &str, binding: &RouteBinding) -> ConfigResult<()> {
        if let Strategy::NetworkFirstTimeout(timeout) = binding.strategy {
            ConfigValidator::validate_timeout(timeout, &format!("{name} network timeout"))?;
        }
        Ok(())
    }
}

impl Validator for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_version(&self.version)?;
        ConfigValidator::validate_origin(&self.origin)?;
        ConfigValidator::validate_prefix(&self.api_prefix, "api prefix")?;

        for prefix in &self.sensitive_prefixes {
            ConfigValidator::validate_prefix(prefix, "sensitive prefix")?;
        }

        for asset in &self.bootstrap_assets {
            self.resolve(asset)?;
        }
        self.resolve(&self.offline_document)?;

        for (name, binding) in self.routes.iter() {
            Self::validate_binding(name, binding)?;
        }

        for (kind, max) in &self.max_entries {
            if *kind == NamespaceKind::Static {
                return Err(ConfigurationError::InvalidCeiling(
                    "the static namespace is managed at activation and cannot be bounded"
                        .to_string(),
                ));
            }
            if *max == 0 {
                return Err(ConfigurationError::InvalidCeiling(format!(
                    "{kind} ceiling must be at least 1"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_match_deployment() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network_timeout(), Some(Duration::from_millis(3000)));
        assert_eq!(config.max_entries_for(NamespaceKind::Runtime), Some(100));
        assert_eq!(config.max_entries_for(NamespaceKind::Static), None);
        assert_eq!(config.namespace(NamespaceKind::Api).to_string(), "api-v6.0.0");
    }

    #[test]
    fn bounding_static_is_rejected() {
        let config = EngineConfig::default().with_max_entries(NamespaceKind::Static, 10);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidCeiling(_))
        ));
    }

    #[test]
    fn network_timeout_updates_network_first_bindings() {
        let config = EngineConfig::default().with_network_timeout(Duration::from_millis(250));
        assert_eq!(config.network_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.routes.assets.strategy, Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn json_overrides_only_given_fields() {
        let config = EngineConfig::from_json_str(
            r#"{
                "version": "v7",
                "origin": "https://app.example/",
                "bootstrap_assets": ["/", "/index.html"],
                "routes": {
                    "api": { "strategy": { "network_first_timeout": 1500 }, "namespace": "api" }
                },
                "max_entries": { "runtime": 20 }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.version, "v7");
        assert_eq!(config.network_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.routes.assets.strategy, Strategy::StaleWhileRevalidate);
        assert_eq!(config.max_entries_for(NamespaceKind::Runtime), Some(20));
        assert_eq!(config.max_entries_for(NamespaceKind::Api), Some(100));
        assert_eq!(config.sensitive_prefixes.len(), 3);
    }

    #[test]
    fn json_null_ceiling_removes_bound() {
        let config = EngineConfig::from_json_str(r#"{ "max_entries": { "api": null } }"#)
            .expect("valid config");

        assert_eq!(config.max_entries_for(NamespaceKind::Api), None);
        assert_eq!(config.max_entries_for(NamespaceKind::Runtime), Some(100));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigurationError::Load(_))
        ));
    }
}
