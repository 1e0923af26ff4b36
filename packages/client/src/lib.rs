//! # cachegate client
//!
//! Request interception and offline caching engine. Sits between a client
//! and the network, classifies every outgoing request, and serves it with a
//! per-route fetch/serve strategy backed by a versioned, namespaced cache.
//!
//! ## Features
//!
//! - **Route classification** with bypass for cross-origin, non-GET and sensitive paths
//! - **Strategies**: cache-first, network-first with an aborting deadline,
//!   stale-while-revalidate with per-key de-duplication, navigation preload
//! - **Versioned namespaces** pre-warmed at install and garbage-collected at activation
//! - **Bounded namespaces** trimmed oldest-first after every write
//! - **Memory and file backends** behind one `StorageBackend` trait
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cachegate_client::prelude::*;
//!
//! # async fn run() -> cachegate_client::Result<()> {
//! let registration = Registration::new(CacheStore::memory(), Arc::new(HttpFetcher::new()?));
//! registration.update(EngineConfig::default()).await?;
//!
//! let client = registration.connect().await;
//! let url = Url::parse("http://localhost/index.html").expect("valid url");
//! let event = FetchEvent::new(InterceptedRequest::navigation(url)).from_client(client);
//! let response = registration.respond(event).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod registration;
pub mod routing;
pub mod strategy;
pub mod telemetry;

pub mod prelude;

pub use crate::error::{Error, Result};
pub use crate::prelude::*;
