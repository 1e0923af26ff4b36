//! Configuration validation utilities

use std::time::Duration;

use url::Url;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid version tag: {0}")]
    InvalidVersion(String),

    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    #[error("Invalid route prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid asset path: {0}")]
    InvalidAsset(String),

    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid entry ceiling: {0}")]
    InvalidCeiling(String),

    #[error("Configuration could not be read: {0}")]
    Load(String),
}

impl From<ConfigurationError> for crate::error::Error {
    fn from(e: ConfigurationError) -> Self {
        crate::error::configuration(e)
    }
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found.
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if the timeout is zero or
    /// exceeds one hour.
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout.as_secs() > 3600 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }

        Ok(())
    }

    /// Version tags become part of namespace names, so `-` is reserved
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidVersion` for empty tags or tags
    /// outside `[A-Za-z0-9._]`.
    pub fn validate_version(version: &str) -> ConfigResult<()> {
        if version.is_empty() {
            return Err(ConfigurationError::InvalidVersion(
                "version cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = version
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_')))
        {
            return Err(ConfigurationError::InvalidVersion(format!(
                "{version:?} contains {bad:?}"
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidOrigin` unless the URL is an
    /// http(s) origin.
    pub fn validate_origin(origin: &Url) -> ConfigResult<()> {
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidOrigin(format!(
                "{origin} is not http(s)"
            )));
        }
        if origin.host_str().is_none() {
            return Err(ConfigurationError::InvalidOrigin(format!(
                "{origin} has no host"
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPrefix` unless the prefix is an
    /// absolute path.
    pub fn validate_prefix(prefix: &str, name: &str) -> ConfigResult<()> {
        if !prefix.starts_with('/') {
            return Err(ConfigurationError::InvalidPrefix(format!(
                "{name} {prefix:?} must start with '/'"
            )));
        }
        Ok(())
    }

    /// Resolve `path` against `origin`, requiring the result to stay same-origin
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAsset` if the path does not parse
    /// or points at another origin.
    pub fn resolve_same_origin(origin: &Url, path: &str) -> ConfigResult<Url> {
        let url = origin
            .join(path)
            .map_err(|e| ConfigurationError::InvalidAsset(format!("{path:?}: {e}")))?;
        if url.origin() != origin.origin() {
            return Err(ConfigurationError::InvalidAsset(format!(
                "{path:?} is not on {origin}"
            )));
        }
        Ok(url)
    }
}
