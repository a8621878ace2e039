//! fetch tool implementation.
//!
//! Sends one request through the cache policy and reports which strategy
//! answered it and where the response came from.

use std::collections::BTreeMap;

use offline_core::policy::{Destination, Source, Strategy};
use offline_core::{CachePolicy, Error, InterceptedRequest};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination. Guessed from the path extension when omitted.
    #[serde(default)]
    pub destination: Option<Destination>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, sent as-is.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// Strategy that handled the request; null when the policy was not active.
    pub strategy: Option<Strategy>,
    /// Whether the response came from a store or from the network.
    pub source: Source,
    pub status: u16,
    pub headers: Vec<HeaderField>,
    /// Response body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

pub async fn fetch_impl(policy: &CachePolicy, params: FetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method must not be empty".into()).into());
    }

    let url = policy.resolve(&params.url)?;
    let destination = params
        .destination
        .unwrap_or_else(|| Destination::guess_from_path(url.path()));

    let mut request = InterceptedRequest::new(params.method.trim(), url).with_destination(destination);
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    let url = request.url.to_string();
    let intercepted = policy.handle_fetch(request).await?;
    let response = intercepted.response;

    tracing::debug!(
        url = %url,
        strategy = ?intercepted.strategy,
        source = ?intercepted.source,
        status = response.status,
        "fetch tool answered"
    );

    let output = FetchOutput {
        url,
        strategy: intercepted.strategy,
        source: intercepted.source,
        status: response.status,
        headers: response
            .headers
            .iter()
            .map(|(name, value)| HeaderField { name: name.clone(), value: value.clone() })
            .collect(),
        body: response.body_text().into_owned(),
        body_bytes: response.body.len(),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_policy, output_json, registered_policy};
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn params(url: &str) -> FetchParams {
        FetchParams {
            url: url.to_string(),
            method: default_method(),
            destination: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let (_server, policy) = active_policy().await;
        let err = fetch_impl(&policy, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_url() {
        let (_server, policy) = active_policy().await;
        let err = fetch_impl(&policy, params("ftp://files.example.com/a.js")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[tokio::test]
    async fn test_fetch_image_is_cached_after_first_request() {
        let (server, policy) = active_policy().await;
        Mock::given(method("GET"))
            .and(path("/assets/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_string("png-bytes"))
            .expect(1)
            .mount(&server)
            .await;

        let first = output_json(&fetch_impl(&policy, params("/assets/logo.png")).await.unwrap());
        assert_eq!(first["strategy"], "cache_first");
        assert_eq!(first["source"], "network");
        policy.settle().await;

        let second = output_json(&fetch_impl(&policy, params("/assets/logo.png")).await.unwrap());
        assert_eq!(second["source"], "cache");
        assert_eq!(second["status"], 200);
        assert_eq!(second["body"], "png-bytes");
    }

    #[tokio::test]
    async fn test_fetch_api_post_goes_to_network() {
        let (server, policy) = active_policy().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ventas"))
            .and(body_string("{\"total\":10}"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"id\":7}"))
            .mount(&server)
            .await;

        let request = FetchParams {
            method: "post".into(),
            body: Some("{\"total\":10}".into()),
            ..params("/api/v1/ventas")
        };
        let output = output_json(&fetch_impl(&policy, request).await.unwrap());

        assert_eq!(output["strategy"], "stale_while_revalidate");
        assert_eq!(output["source"], "network");
        assert_eq!(output["status"], 201);
        assert_eq!(output["body"], "{\"id\":7}");
    }

    #[tokio::test]
    async fn test_fetch_explicit_destination_overrides_guess() {
        let (server, policy) = active_policy().await;
        Mock::given(method("GET"))
            .and(path("/fonts/app"))
            .respond_with(ResponseTemplate::new(200).set_body_string("style"))
            .mount(&server)
            .await;

        let request = FetchParams { destination: Some(Destination::Style), ..params("/fonts/app") };
        let output = output_json(&fetch_impl(&policy, request).await.unwrap());
        assert_eq!(output["strategy"], "cache_first");
    }

    #[tokio::test]
    async fn test_fetch_passes_through_before_activation() {
        let (server, policy) = registered_policy().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/productos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let output = output_json(&fetch_impl(&policy, params("/api/v1/productos")).await.unwrap());
        assert!(output["strategy"].is_null());
        assert_eq!(output["source"], "network");
    }

    #[tokio::test]
    async fn test_fetch_network_first_serves_precache_when_origin_fails() {
        let (server, policy) = active_policy().await;
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/index.html"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let output = output_json(&fetch_impl(&policy, params("/index.html")).await.unwrap());
        assert_eq!(output["strategy"], "network_first");
        assert_eq!(output["source"], "cache");
        assert_eq!(output["body"], "precached /index.html");
    }
}
