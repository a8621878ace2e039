//! The network capability consumed by the policy.

use async_trait::async_trait;

use super::request::InterceptedRequest;
use crate::Error;
use crate::cache::Response;

/// Sends a request to the network.
///
/// Any HTTP status is a successful fetch. `Err` means the request never
/// produced a response (offline, DNS failure, timeout, oversize body).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error>;
}
