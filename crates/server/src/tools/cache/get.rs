//! cache_get tool implementation.
//!
//! Retrieves the stored GET response for a URL.

use offline_core::{CachePolicy, Error, RequestKey};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::fetch::HeaderField;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// Only look in this store. All stores are searched, oldest first, when omitted.
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// The request URL the entry is keyed by.
    pub url: String,
    /// Final URL recorded with the response.
    pub response_url: String,
    pub status: u16,
    pub headers: Vec<HeaderField>,
    pub body: String,
    pub body_bytes: usize,
}

pub async fn get_impl(policy: &CachePolicy, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = policy.resolve(&params.url)?;
    let key = RequestKey::get(&url);

    let storage = policy.storage();
    let response = match params.store.as_deref() {
        Some(store) => storage.match_in(store, &key).await?,
        None => storage.match_any(&key).await?,
    }
    .ok_or_else(|| Error::CacheMiss(key.url.clone()))?;

    let output = CacheGetOutput {
        url: key.url,
        response_url: response.url.clone(),
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
    use crate::tools::testing::{active_policy, output_json};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let (_server, policy) = active_policy().await;
        let params = CacheGetParams { url: "/api/v1/nothing".to_string(), store: None };

        let err = get_impl(&policy, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found_in_any_store() {
        let (_server, policy) = active_policy().await;
        let params = CacheGetParams { url: "/src/main.tsx".to_string(), store: None };

        let output = output_json(&get_impl(&policy, params).await.unwrap());
        assert_eq!(output["status"], 200);
        assert_eq!(output["body"], "precached /src/main.tsx");
    }

    #[tokio::test]
    async fn test_get_impl_respects_store() {
        let (_server, policy) = active_policy().await;

        let params = CacheGetParams { url: "/index.html".to_string(), store: Some("alexa-tech-api-v1".into()) };
        assert!(get_impl(&policy, params).await.is_err());

        let params = CacheGetParams { url: "/index.html".to_string(), store: Some("alexa-tech-static-v1".into()) };
        assert!(get_impl(&policy, params).await.is_ok());
    }
}
