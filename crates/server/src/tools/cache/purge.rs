//! cache_purge tool implementation.
//!
//! Deletes a whole named store.

use offline_core::{CachePolicy, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Name of the store to delete.
    pub store: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub store: String,
    /// False when no such store existed.
    pub deleted: bool,
}

pub async fn purge_impl(policy: &CachePolicy, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let store = params.store.trim();
    if store.is_empty() {
        return Err(Error::InvalidInput("store must not be empty".to_string()).into());
    }

    let deleted = policy.storage().delete(store).await?;
    tracing::info!(store = %store, deleted, "purge requested");

    json_result(&CachePurgeOutput { store: store.to_string(), deleted })
}
