//! Policies over a mock origin for tool tests.

use std::sync::Arc;

use offline_client::{FetchClient, FetchConfig};
use offline_core::{AppConfig, CacheDb, CachePolicy, PolicyOptions};
use rmcp::model::CallToolResult;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MANIFEST: [&str; 4] = ["/", "/index.html", "/src/main.tsx", "/manifest.json"];

/// A policy over an in-memory database that has not been installed yet.
pub async fn registered_policy() -> (MockServer, Arc<CachePolicy>) {
    let server = MockServer::start().await;
    let config = AppConfig { origin: server.uri(), timeout_ms: 1_000, ..Default::default() };

    let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config)).unwrap());
    let options = PolicyOptions::from_config(&config).unwrap();
    let policy = Arc::new(CachePolicy::new(storage, network, options).unwrap());

    (server, policy)
}

/// A policy that precached the manifest and activated.
pub async fn active_policy() -> (MockServer, Arc<CachePolicy>) {
    let (server, policy) = registered_policy().await;
    for target in MANIFEST {
        Mock::given(method("GET"))
            .and(path(target))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("precached {target}")))
            .mount(&server)
            .await;
    }
    policy.install().await.unwrap();
    policy.activate().await.unwrap();

    (server, policy)
}

/// Parse the JSON text content of a tool result.
pub fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
