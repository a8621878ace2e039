//! mcp-offline server entry point.
//!
//! Boots the request cache policy (install, then activate) and serves it as
//! MCP tools on stdio. Logging goes to stderr to keep stdout for JSON-RPC.

use std::sync::Arc;

use anyhow::Result;
use offline_client::{FetchClient, FetchConfig};
use offline_core::{AppConfig, CacheDb, CachePolicy, PolicyOptions};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        version = %config.version,
        db_path = %config.db_path.display(),
        "Starting mcp-offline server on stdio transport"
    );

    let storage = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let policy = Arc::new(CachePolicy::new(storage, network, PolicyOptions::from_config(&config)?)?);

    match policy.install().await {
        Ok(_) => {
            policy.activate().await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "install failed");
            if !policy.resume().await? {
                tracing::warn!("no precache from an earlier run, requests pass through uncached");
            }
        }
    }

    let handler = handler::McpOfflineServer::new(policy.clone());
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    policy.settle().await;

    Ok(())
}
