//! Engine configuration
//!
//! Static, supplied at startup, immutable while a version is deployed.

pub mod core;
pub mod duration_ms;
pub mod routes;
pub mod validation;

pub use core::EngineConfig;
pub use routes::{DEFAULT_NETWORK_TIMEOUT, RouteBinding, RouteBindings};
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
