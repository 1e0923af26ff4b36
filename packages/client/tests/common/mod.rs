//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cachegate_client::error::{self, Result};
use cachegate_client::prelude::*;
use dashmap::DashMap;

pub const ORIGIN: &str = "http://localhost/";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN)
        .and_then(|origin| origin.join(path))
        .expect("valid test url")
}

pub fn get(path: &str) -> InterceptedRequest {
    InterceptedRequest::get(url(path))
}

pub fn navigate(path: &str) -> InterceptedRequest {
    InterceptedRequest::navigation(url(path))
}

/// Config with short, test-friendly bootstrap list
pub fn config(version: &str) -> EngineConfig {
    EngineConfig::default()
        .with_version(version)
        .with_bootstrap_assets(["/", "/index.html", "/app.js"])
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Respond(HttpResponse),
    /// Respond after a delay, honouring the abort signal
    Delay(Duration, HttpResponse),
    Fail,
}

/// Scripted fetcher keyed by URL path
///
/// Unscripted paths answer `200 ok:{path}`.
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: DashMap<String, Behavior>,
    calls: DashMap<String, usize>,
    aborted: AtomicUsize,
    dropped: AtomicUsize,
    signals: Mutex<Vec<AbortSignal>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, response: HttpResponse) {
        self.routes.insert(path.to_string(), Behavior::Respond(response));
    }

    pub fn delay(&self, path: &str, delay: Duration, response: HttpResponse) {
        self.routes
            .insert(path.to_string(), Behavior::Delay(delay, response));
    }

    pub fn fail(&self, path: &str) {
        self.routes.insert(path.to_string(), Behavior::Fail);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.get(path).map_or(0, |count| *count)
    }

    /// Fetches that observed their abort signal
    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Every abort signal handed to this fetcher, in call order
    pub fn signals(&self) -> Vec<AbortSignal> {
        self.signals.lock().expect("signals lock").clone()
    }

    /// Fetches dropped before they completed
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

struct DropGuard<'a> {
    counter: &'a AtomicUsize,
    armed: bool,
}

impl Drop for DropGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &InterceptedRequest, signal: AbortSignal) -> Result<HttpResponse> {
        let path = request.url().path().to_string();
        *self.calls.entry(path.clone()).or_insert(0) += 1;
        self.signals
            .lock()
            .expect("signals lock")
            .push(signal.clone());

        let behavior = self
            .routes
            .get(&path)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| Behavior::Respond(HttpResponse::ok(format!("ok:{path}"))));

        let mut guard = DropGuard {
            counter: &self.dropped,
            armed: true,
        };

        let result = match behavior {
            Behavior::Respond(response) => Ok(response),
            Behavior::Fail => Err(error::network(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "offline",
            ))),
            Behavior::Delay(delay, response) => {
                tokio::select! {
                    () = tokio::time::sleep(delay) => Ok(response),
                    () = signal.aborted() => {
                        self.aborted.fetch_add(1, Ordering::SeqCst);
                        Err(error::aborted(request.url().clone()))
                    }
                }
            }
        };

        guard.armed = false;
        result
    }
}

pub fn json(body: &str) -> HttpResponse {
    HttpResponse::ok(body.to_string()).with_header(
        ::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    )
}

/// Registration with `version` installed and active
pub async fn active_registration(version: &str, fetcher: &Arc<MockFetcher>) -> Registration {
    let registration = Registration::new(CacheStore::memory(), fetcher.clone());
    registration
        .update(config(version))
        .await
        .expect("install succeeds");
    registration
}
