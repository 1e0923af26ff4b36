//! cachegate prelude
//!
//! The types embedders need to deploy a version and route fetch events.

// Request/response descriptors
pub use crate::http::{HttpResponse, InterceptedRequest, ResponseKind};

pub use crate::error::{Error, Kind};

// Deployment and routing
pub use crate::config::{EngineConfig, RouteBinding, RouteBindings, Validator};
pub use crate::lifecycle::{ClientId, LifecycleState};
pub use crate::registration::{FetchEvent, Registration};
pub use crate::routing::{BypassReason, RouteClass};
pub use crate::strategy::engine::Interception;
pub use crate::strategy::{ResponseSource, Served, Strategy};

// Storage
pub use crate::cache::{CacheStore, FileBackend, MemoryBackend, NamespaceKind, StorageBackend};

// Network boundary
pub use crate::fetch::{AbortSignal, Fetcher, HttpFetcher};

// HTTP standard types from http crate
pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

pub use url::Url;

pub use crate::telemetry::{CacheStats, CacheStatsSnapshot};
