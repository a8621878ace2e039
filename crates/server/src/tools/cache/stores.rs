//! cache_stores tool implementation.
//!
//! Reports the lifecycle state, the allow-list and every store on disk.

use offline_core::cache::StoreSummary;
use offline_core::policy::LifecycleState;
use offline_core::{CachePolicy, StoreNames};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use crate::tools::json_result;

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheStoresOutput {
    pub lifecycle: LifecycleState,
    /// Store names the current version keeps on activation.
    pub allow_list: StoreNames,
    /// Every existing store, oldest first.
    pub stores: Vec<StoreSummary>,
}

pub async fn stores_impl(policy: &CachePolicy) -> Result<CallToolResult, McpError> {
    let stores = policy.storage().summaries().await?;

    let output = CacheStoresOutput { lifecycle: policy.state(), allow_list: policy.names().clone(), stores };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_policy, output_json, registered_policy};

    #[tokio::test]
    async fn test_stores_before_install() {
        let (_server, policy) = registered_policy().await;

        let output = output_json(&stores_impl(&policy).await.unwrap());
        assert_eq!(output["lifecycle"]["phase"], "registered");
        assert_eq!(output["lifecycle"]["skip_waiting"], false);
        assert_eq!(output["stores"].as_array().unwrap().len(), 0);
        assert_eq!(output["allow_list"]["static_assets"], "alexa-tech-static-v1");
    }

    #[tokio::test]
    async fn test_stores_after_activation() {
        let (_server, policy) = active_policy().await;

        let output = output_json(&stores_impl(&policy).await.unwrap());
        assert_eq!(output["lifecycle"]["phase"], "active");
        assert_eq!(output["lifecycle"]["claimed"], true);

        let stores = output["stores"].as_array().unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0]["name"], "alexa-tech-static-v1");
        assert_eq!(stores[0]["entries"], 4);
    }
}
