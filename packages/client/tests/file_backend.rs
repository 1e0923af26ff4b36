//! File backend durability

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cachegate_client::cache::{CacheEntry, NamespaceName, RequestId};
use cachegate_client::prelude::*;

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("cachegate-{name}-{}-{nanos}", std::process::id()))
}

fn id(path: &str) -> RequestId {
    RequestId::for_url(&Url::parse("http://localhost/").expect("origin").join(path).expect("path"))
}

fn entry(body: &str) -> CacheEntry {
    let response = HttpResponse::ok(body.to_string()).with_header(
        ::http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain"),
    );
    CacheEntry::from_response(&response)
}

#[tokio::test]
async fn entries_survive_reopen_in_insertion_order() {
    let root = scratch_dir("reopen");
    let name = NamespaceName::new(NamespaceKind::Runtime, "v1");

    {
        let store = CacheStore::new(FileBackend::open(&root).await.expect("open"));
        let handle = store.open(&name);
        handle.put(&id("/a.css"), entry("a")).await.expect("put a");
        handle.put(&id("/b.css"), entry("b")).await.expect("put b");
    }

    let store = CacheStore::new(FileBackend::open(&root).await.expect("reopen"));
    let handle = store.open(&name);

    let stored = handle
        .lookup(&id("/a.css"))
        .await
        .expect("lookup")
        .expect("persisted");
    assert_eq!(stored.body, "a");
    assert_eq!(
        stored.headers.get(::http::header::CONTENT_TYPE),
        Some(&HeaderValue::from_static("text/plain"))
    );

    // New writes after reopen sort after everything already on disk
    handle.put(&id("/a.css"), entry("a2")).await.expect("overwrite");
    assert_eq!(
        handle.keys().await.expect("keys"),
        vec![id("/b.css"), id("/a.css")]
    );

    tokio::fs::remove_dir_all(&root).await.expect("cleanup");
}

#[tokio::test]
async fn namespaces_are_directories() {
    let root = scratch_dir("namespaces");
    let store = CacheStore::new(FileBackend::open(&root).await.expect("open"));

    for kind in NamespaceKind::ALL {
        store
            .open(&NamespaceName::new(kind, "v2"))
            .put(&id("/"), entry("root"))
            .await
            .expect("put");
    }

    let mut names = store.namespaces().await.expect("list");
    names.sort();
    assert_eq!(names, vec!["api-v2", "runtime-v2", "static-v2"]);

    assert!(store.delete_namespace("api-v2").await.expect("delete"));
    assert!(!root.join("api-v2").exists());

    tokio::fs::remove_dir_all(&root).await.expect("cleanup");
}

#[tokio::test]
async fn path_like_namespace_names_are_rejected() {
    let root = scratch_dir("reject");
    let backend = FileBackend::open(&root).await.expect("open");

    let err = backend
        .insert("../escape", &id("/"), entry("x"))
        .await
        .expect_err("invalid namespace");
    assert!(err.is_store());

    tokio::fs::remove_dir_all(&root).await.expect("cleanup");
}
