//! Cache store, eviction and backend failure handling

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use cachegate_client::cache::{CacheEntry, NamespaceName, RequestId};
use cachegate_client::error::{self, Result};
use cachegate_client::prelude::*;
use cachegate_client::strategy::StrategyEngine;

use common::{MockFetcher, url};

fn id(path: &str) -> RequestId {
    RequestId::for_url(&url(path))
}

fn entry(body: &str) -> CacheEntry {
    CacheEntry::from_response(&HttpResponse::ok(body.to_string()))
}

#[tokio::test]
async fn opening_a_namespace_does_not_create_it() {
    let store = CacheStore::memory();
    let name = NamespaceName::new(NamespaceKind::Runtime, "v1");
    let handle = store.open(&name);

    assert!(!store.has_namespace("runtime-v1").await.expect("list"));
    handle.put(&id("/a.js"), entry("a")).await.expect("put");
    assert!(store.has_namespace("runtime-v1").await.expect("list"));
}

#[tokio::test]
async fn overwrite_moves_entry_to_newest() {
    let store = CacheStore::memory();
    let handle = store.open(&NamespaceName::new(NamespaceKind::Runtime, "v1"));

    for path in ["/a.js", "/b.js", "/c.js"] {
        handle.put(&id(path), entry(path)).await.expect("put");
    }
    handle.put(&id("/a.js"), entry("a2")).await.expect("overwrite");

    let keys = handle.keys().await.expect("keys");
    assert_eq!(keys, vec![id("/b.js"), id("/c.js"), id("/a.js")]);

    let stored = handle.lookup(&id("/a.js")).await.expect("lookup");
    assert_eq!(stored.expect("present").body, "a2");
}

#[tokio::test]
async fn trim_removes_oldest_first() {
    let store = CacheStore::memory();
    let handle = store.open(&NamespaceName::new(NamespaceKind::Api, "v1"));

    for n in 0..5 {
        handle
            .put(&id(&format!("/api/items/{n}")), entry("item"))
            .await
            .expect("put");
    }

    assert_eq!(handle.trim(2).await.expect("trim"), 3);
    assert_eq!(
        handle.keys().await.expect("keys"),
        vec![id("/api/items/3"), id("/api/items/4")]
    );
    assert_eq!(handle.trim(2).await.expect("trim"), 0);
    assert_eq!(store.stats().snapshot().evictions, 3);
}

#[tokio::test]
async fn put_bounded_never_leaves_namespace_above_ceiling() {
    let store = CacheStore::memory();
    let handle = store.open(&NamespaceName::new(NamespaceKind::Runtime, "v1"));

    let writes = (0..20).map(|n| {
        let handle = handle.clone();
        async move {
            handle
                .put_bounded(&id(&format!("/img/{n}.png")), entry("png"), Some(4))
                .await
        }
    });
    for result in futures::future::join_all(writes).await {
        result.expect("bounded put");
    }

    assert_eq!(handle.len().await.expect("len"), 4);
}

#[tokio::test]
async fn delete_namespace_drops_entries() {
    let store = CacheStore::memory();
    let handle = store.open(&NamespaceName::new(NamespaceKind::Static, "v1"));
    handle.put(&id("/"), entry("root")).await.expect("put");

    assert!(store.delete_namespace("static-v1").await.expect("delete"));
    assert!(!store.delete_namespace("static-v1").await.expect("delete"));
    assert_eq!(handle.lookup(&id("/")).await.expect("lookup"), None);
}

/// Backend whose every operation fails
#[derive(Debug)]
struct BrokenBackend;

fn broken<T>() -> Result<T> {
    Err(error::store(std::io::Error::other("quota exceeded")))
}

#[async_trait]
impl StorageBackend for BrokenBackend {
    async fn lookup(&self, _: &str, _: &RequestId) -> Result<Option<CacheEntry>> {
        broken()
    }
    async fn insert(&self, _: &str, _: &RequestId, _: CacheEntry) -> Result<u64> {
        broken()
    }
    async fn remove(&self, _: &str, _: &RequestId) -> Result<bool> {
        broken()
    }
    async fn keys(&self, _: &str) -> Result<Vec<RequestId>> {
        broken()
    }
    async fn namespaces(&self) -> Result<Vec<String>> {
        broken()
    }
    async fn contains_namespace(&self, _: &str) -> Result<bool> {
        broken()
    }
    async fn drop_namespace(&self, _: &str) -> Result<bool> {
        broken()
    }
}

#[tokio::test]
async fn store_failure_degrades_to_network() {
    let fetcher = MockFetcher::new();
    let store = CacheStore::new(BrokenBackend);
    let engine = StrategyEngine::new(
        Arc::new(common::config("v1")),
        store.clone(),
        fetcher.clone(),
    );
    let binding = RouteBinding::new(Strategy::CacheFirst, NamespaceKind::Runtime);

    let served = engine.execute(binding, &common::get("/app.js"), None).await;

    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(served.response.body, "ok:/app.js");
    let stats = store.stats().snapshot();
    assert_eq!(stats.store_errors, 2);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn store_failure_surfaces_as_store_unavailable() {
    let store = CacheStore::new(BrokenBackend);
    let handle = store.open(&NamespaceName::new(NamespaceKind::Runtime, "v1"));

    let err = handle.lookup(&id("/x")).await.expect_err("broken backend");
    assert!(err.is_store());
}
