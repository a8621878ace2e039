//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`], all sharing
//! one [`CachePolicy`].
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl, stores_impl};
use crate::tools::fetch::{FetchParams, fetch_impl};

use offline_core::CachePolicy;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for mcp-offline.
#[derive(Clone)]
pub struct McpOfflineServer {
    policy: Arc<CachePolicy>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl McpOfflineServer {
    pub fn new(policy: Arc<CachePolicy>) -> Self {
        Self { policy, tool_router: Self::tool_router() }
    }

    /// Send a request through the cache policy.
    #[tool(
        description = "Fetch a URL through the offline cache policy. Static assets are cache-first, API paths are stale-while-revalidate, everything else is network-first. Returns the strategy, where the response came from, and the response."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.policy, params.0).await
    }

    #[tool(description = "List the lifecycle phase, the store allow-list, and every store with its entry count.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.policy).await
    }

    #[tool(description = "Look up the stored GET response for a URL, in one store or in all stores.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.policy, params.0).await
    }

    #[tool(description = "Delete a whole named store.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.policy, params.0).await
    }
}

impl ServerHandler for McpOfflineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
