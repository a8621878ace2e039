use std::sync::Arc;
use std::time::Duration;

use offline_client::{FetchClient, FetchConfig};
use offline_core::policy::{Destination, Source, Strategy};
use offline_core::{AppConfig, CacheDb, CachePolicy, InterceptedRequest, PolicyOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn active_policy(server: &MockServer) -> CachePolicy {
    for route in ["/", "/index.html", "/src/main.tsx", "/manifest.json"] {
        mount(server, route, 200, route).await;
    }

    let config = AppConfig { origin: server.uri(), timeout_ms: 1_000, ..Default::default() };
    let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config)).unwrap());
    let policy = CachePolicy::new(storage, network, PolicyOptions::from_config(&config).unwrap()).unwrap();

    assert_eq!(policy.install().await.unwrap(), 4);
    assert!(policy.activate().await.unwrap().is_empty());
    policy
}

#[tokio::test]
async fn test_assets_and_api_served_from_cache_after_origin_changes() {
    let server = MockServer::start().await;
    let policy = active_policy(&server).await;
    mount(&server, "/assets/app.js", 200, "console.log('app')").await;
    mount(&server, "/api/v1/productos", 200, "[\"v1\"]").await;

    let script = InterceptedRequest::get(policy.resolve("/assets/app.js").unwrap()).with_destination(Destination::Script);
    let products = InterceptedRequest::get(policy.resolve("/api/v1/productos").unwrap());

    assert_eq!(policy.handle_fetch(script.clone()).await.unwrap().source, Source::Network);
    assert_eq!(policy.handle_fetch(products.clone()).await.unwrap().source, Source::Network);
    policy.settle().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/productos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\"v2\"]"))
        .expect(2)
        .mount(&server)
        .await;

    let cached_script = policy.handle_fetch(script).await.unwrap();
    assert_eq!(cached_script.strategy, Some(Strategy::CacheFirst));
    assert_eq!(cached_script.source, Source::Cache);
    assert_eq!(cached_script.response.body_text(), "console.log('app')");

    let stale = policy.handle_fetch(products.clone()).await.unwrap();
    assert_eq!(stale.source, Source::Cache);
    assert_eq!(stale.response.body_text(), "[\"v1\"]");
    policy.settle().await;

    let refreshed = policy.handle_fetch(products).await.unwrap();
    assert_eq!(refreshed.response.body_text(), "[\"v2\"]");
    policy.settle().await;
}

#[tokio::test]
async fn test_document_falls_back_to_precache_when_origin_stalls() {
    let server = MockServer::start().await;
    let policy = active_policy(&server).await;
    let shell = InterceptedRequest::get(policy.resolve("/index.html").unwrap()).with_destination(Destination::Document);

    let online = policy.handle_fetch(shell.clone()).await.unwrap();
    assert_eq!(online.strategy, Some(Strategy::NetworkFirst));
    assert_eq!(online.source, Source::Network);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let offline = policy.handle_fetch(shell).await.unwrap();
    assert_eq!(offline.source, Source::Cache);
    assert_eq!(offline.response.body_text(), "/index.html");
}

#[tokio::test]
async fn test_uncached_document_on_dead_origin_fails() {
    let server = MockServer::start().await;
    let policy = active_policy(&server).await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://127.0.0.1:{}/index.html", listener.local_addr().unwrap().port());
    drop(listener);

    let result = policy.handle_fetch(InterceptedRequest::get(policy.resolve(&dead).unwrap())).await;
    assert!(matches!(result, Err(offline_core::Error::NetworkFailed(_))));
}
