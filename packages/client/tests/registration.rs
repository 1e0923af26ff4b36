//! Install, activation, client control and routing through the registration

mod common;

use std::time::Duration;

use cachegate_client::cache::{CacheEntry, NamespaceName, RequestId};
use cachegate_client::prelude::*;

use common::{MockFetcher, active_registration, get, navigate, url};

#[tokio::test]
async fn nothing_is_intercepted_before_activation() {
    let fetcher = MockFetcher::new();
    let registration = Registration::new(CacheStore::memory(), fetcher.clone());

    let outcome = registration.handle(FetchEvent::new(navigate("/"))).await;

    assert_eq!(
        outcome,
        Interception::Bypass {
            request: navigate("/"),
            reason: BypassReason::NoActiveWorker,
        }
    );
}

#[tokio::test]
async fn install_prewarms_static_namespace() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;

    let active = registration.active().await.expect("active worker");
    assert_eq!(active.state(), LifecycleState::Active);
    assert!(active.engine().navigation_preload_enabled());

    let statics = registration
        .store()
        .open(&NamespaceName::new(NamespaceKind::Static, "v1"));
    assert_eq!(statics.len().await.expect("len"), 3);
    for path in ["/", "/index.html", "/app.js"] {
        assert_eq!(fetcher.calls(path), 1);
    }
}

#[tokio::test]
async fn failed_install_leaves_previous_version_serving() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    fetcher.fail("/app.js");

    let err = registration
        .update(common::config("v2"))
        .await
        .expect_err("asset fetch fails");

    assert!(err.is_install());
    assert_eq!(registration.active_version().await.as_deref(), Some("v1"));
    assert!(registration.waiting().await.is_none());
    let names = registration.store().namespaces().await.expect("list");
    assert!(!names.contains(&"static-v2".to_string()));
    assert!(names.contains(&"static-v1".to_string()));
}

#[tokio::test]
async fn ineligible_bootstrap_asset_fails_install() {
    let fetcher = MockFetcher::new();
    fetcher.respond(
        "/index.html",
        HttpResponse::ok("gone").with_status(StatusCode::NOT_FOUND),
    );
    let registration = Registration::new(CacheStore::memory(), fetcher.clone());

    let err = registration
        .update(common::config("v1"))
        .await
        .expect_err("404 is not cacheable");

    assert!(err.is_install());
    assert!(registration.active().await.is_none());
    assert!(!registration.store().has_namespace("static-v1").await.expect("list"));
}

#[tokio::test]
async fn activation_deletes_everything_outside_the_live_set() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    let client = registration.connect().await;

    // Populate runtime-v1 and an unrelated leftover namespace
    registration
        .respond(FetchEvent::new(get("/style.css")).from_client(client))
        .await
        .expect("served");
    registration
        .store()
        .open(&NamespaceName::new(NamespaceKind::Api, "v0"))
        .put(
            &RequestId::for_url(&url("/api/old")),
            CacheEntry::from_response(&HttpResponse::ok("old")),
        )
        .await
        .expect("seed leftover");

    registration
        .update(common::config("v2"))
        .await
        .expect("install v2");

    assert_eq!(
        registration.store().namespaces().await.expect("list"),
        vec!["static-v2".to_string()]
    );
    assert!(registration.clients().is_controlled_by(client, "v2"));
}

#[tokio::test]
async fn waiting_version_activates_on_request() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    let previous = registration.active().await.expect("v1 active");

    let state = registration
        .update(common::config("v2").with_skip_waiting(false))
        .await
        .expect("install v2");

    assert_eq!(state, LifecycleState::Waiting);
    assert_eq!(registration.active_version().await.as_deref(), Some("v1"));
    assert!(registration.store().has_namespace("static-v1").await.expect("list"));

    let activated = registration.activate_waiting().await.expect("activate");
    assert_eq!(activated.as_deref(), Some("v2"));
    assert_eq!(previous.state(), LifecycleState::Redundant);
    assert!(!registration.store().has_namespace("static-v1").await.expect("list"));
    assert_eq!(registration.activate_waiting().await.expect("noop"), None);
}

#[tokio::test]
async fn redeploying_active_version_is_rejected() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;

    let err = registration
        .update(common::config("v1"))
        .await
        .expect_err("same version");
    assert!(err.is_config());
}

#[tokio::test]
async fn redeploying_waiting_version_is_rejected() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    registration
        .update(common::config("v2").with_skip_waiting(false))
        .await
        .expect("install v2");
    fetcher.fail("/app.js");

    let err = registration
        .update(common::config("v2"))
        .await
        .expect_err("same version already waiting");
    assert!(err.is_config());
    let reason = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(reason.as_deref(), Some("version v2 is already installed and waiting"));
    assert_eq!(fetcher.calls("/app.js"), 2);

    let activated = registration.activate_waiting().await.expect("activate");
    assert_eq!(activated.as_deref(), Some("v2"));
    let statics = registration
        .store()
        .open(&NamespaceName::new(NamespaceKind::Static, "v2"));
    assert_eq!(statics.len().await.expect("len"), 3);
}

#[tokio::test]
async fn invalid_config_is_rejected_before_install() {
    let fetcher = MockFetcher::new();
    let registration = Registration::new(CacheStore::memory(), fetcher.clone());

    let err = registration
        .update(common::config("v1").with_max_entries(NamespaceKind::Static, 10))
        .await
        .expect_err("static ceiling");
    assert!(err.is_config());
    assert_eq!(fetcher.calls("/"), 0);
}

#[tokio::test]
async fn sensitive_paths_are_never_cached() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    let client = registration.connect().await;
    let event = FetchEvent::new(get("/api/auth/login")).from_client(client);

    let outcome = registration.handle(event.clone()).await;
    assert!(matches!(
        outcome,
        Interception::Bypass {
            reason: BypassReason::Sensitive(_),
            ..
        }
    ));

    let response = registration.respond(event).await.expect("passthrough");
    assert_eq!(response.body, "ok:/api/auth/login");
    let api = registration
        .store()
        .open(&NamespaceName::new(NamespaceKind::Api, "v1"));
    assert_eq!(api.len().await.expect("len"), 0);
}

#[tokio::test]
async fn cross_origin_and_non_get_are_bypassed() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;
    let client = registration.connect().await;

    let cdn = InterceptedRequest::get(Url::parse("https://cdn.example.com/lib.js").expect("url"));
    let post = InterceptedRequest::new(Method::POST, url("/api/items"));

    for request in [cdn, post] {
        let outcome = registration
            .handle(FetchEvent::new(request).from_client(client))
            .await;
        assert!(outcome.is_bypass());
    }
    assert_eq!(registration.stats().bypassed, 2);
}

#[tokio::test]
async fn uncontrolled_subresources_bypass_until_navigation() {
    let fetcher = MockFetcher::new();
    let registration = active_registration("v1", &fetcher).await;

    let anonymous = registration.handle(FetchEvent::new(get("/app.js"))).await;
    assert_eq!(
        anonymous,
        Interception::Bypass {
            request: get("/app.js"),
            reason: BypassReason::Uncontrolled,
        }
    );

    let client = registration.connect().await;
    registration.clients().control(client, "v0");
    let foreign = registration
        .handle(FetchEvent::new(get("/app.js")).from_client(client))
        .await;
    assert!(foreign.is_bypass());

    let navigation = registration
        .handle(FetchEvent::new(navigate("/")).from_client(client))
        .await;
    assert!(!navigation.is_bypass());
    assert!(registration.clients().is_controlled_by(client, "v1"));

    let subresource = registration
        .handle(FetchEvent::new(get("/app.js")).from_client(client))
        .await;
    assert_eq!(
        subresource.served().map(|served| served.source),
        Some(ResponseSource::Network)
    );
}

#[tokio::test]
async fn claim_takes_control_of_clients_connected_earlier() {
    let fetcher = MockFetcher::new();
    let registration = Registration::new(CacheStore::memory(), fetcher.clone());
    let early = registration.connect().await;
    assert_eq!(registration.clients().controller(early), None);

    registration
        .update(common::config("v1"))
        .await
        .expect("install");

    assert_eq!(registration.clients().controller(early).as_deref(), Some("v1"));
}

#[tokio::test(start_paused = true)]
async fn retired_version_stops_writing() {
    let fetcher = MockFetcher::new();
    fetcher.delay("/slow.css", Duration::from_secs(1), HttpResponse::ok("css"));
    let registration = active_registration("v1", &fetcher).await;
    let retiring = registration.active().await.expect("v1 active");

    let binding = RouteBinding::new(Strategy::StaleWhileRevalidate, NamespaceKind::Runtime);
    let caller = tokio::time::timeout(
        Duration::from_millis(10),
        retiring.engine().execute(binding, &common::get("/slow.css"), None),
    )
    .await;
    assert!(caller.is_err());

    registration
        .update(common::config("v2"))
        .await
        .expect("install v2");
    assert!(retiring.engine().writes_halted());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fetcher.calls("/slow.css"), 1);
    assert_eq!(retiring.engine().revalidations().in_flight(), 0);
    let names = registration.store().namespaces().await.expect("list");
    assert_eq!(names, vec!["static-v2".to_string()]);
}
