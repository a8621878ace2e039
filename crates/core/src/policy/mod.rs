//! Request cache policy.
//!
//! Decides, per intercepted request, whether to answer from a named store,
//! from the network, or both, and keeps the stores in step with the policy
//! version:
//!
//! - **Install** precaches a manifest into the static store
//! - **Activate** deletes every store outside the current allow-list
//! - **Intercept** classifies each request and applies cache-first,
//!   stale-while-revalidate or network-first
//!
//! Store writes triggered by an interception run as detached tasks. Their
//! failures are logged and never reach the caller; [`CachePolicy::settle`]
//! waits for them.

mod classify;
mod lifecycle;
mod network;
mod request;
mod strategies;

#[cfg(test)]
mod fake;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use url::Url;

use crate::Error;
use crate::cache::{CacheStorage, Response};
use crate::config::{AppConfig, StoreNames};

pub use classify::{Strategy, classify};
pub use lifecycle::{LifecycleState, Phase};
pub use network::Network;
pub use request::{Destination, InterceptedRequest, UrlError, resolve};

/// Where an interception's response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Network,
}

/// The respond-with decision for one request.
#[derive(Debug, Clone)]
pub struct Intercepted {
    /// `None` when the policy was not active and the request passed through.
    pub strategy: Option<Strategy>,
    pub source: Source,
    pub response: Response,
}

impl Intercepted {
    fn from_cache(strategy: Strategy, response: Response) -> Self {
        Self { strategy: Some(strategy), source: Source::Cache, response }
    }

    fn from_network(strategy: Strategy, response: Response) -> Self {
        Self { strategy: Some(strategy), source: Source::Network, response }
    }
}

/// Static policy inputs.
#[derive(Debug, Clone)]
pub struct PolicyOptions {
    pub origin: Url,
    pub names: StoreNames,
    pub api_prefix: String,
    pub precache: Vec<String>,
}

impl PolicyOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            names: config.store_names(),
            api_prefix: config.api_prefix.clone(),
            precache: config.precache.clone(),
        })
    }
}

/// The request cache policy for one version.
pub struct CachePolicy {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    origin: Url,
    names: StoreNames,
    api_prefix: String,
    manifest: Vec<Url>,
    state: Mutex<LifecycleState>,
    background: Mutex<JoinSet<()>>,
}

impl CachePolicy {
    /// Build a policy in the `Registered` phase.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if a precache path cannot be resolved
    /// against the origin.
    pub fn new(
        storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, options: PolicyOptions,
    ) -> Result<Self, Error> {
        let manifest = options
            .precache
            .iter()
            .map(|path| resolve(&options.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            storage,
            network,
            origin: options.origin,
            names: options.names,
            api_prefix: options.api_prefix,
            manifest,
            state: Mutex::new(LifecycleState::default()),
            background: Mutex::new(JoinSet::new()),
        })
    }

    pub fn names(&self) -> &StoreNames {
        &self.names
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Resolve a caller-supplied target against the origin.
    pub fn resolve(&self, target: &str) -> Result<Url, Error> {
        resolve(&self.origin, target).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Produce the single respond-with decision for `request`.
    ///
    /// Before activation the policy does not control requests: they go
    /// straight to the network and nothing is cached.
    pub async fn handle_fetch(&self, request: InterceptedRequest) -> Result<Intercepted, Error> {
        if self.state().phase != Phase::Active {
            tracing::debug!(url = %request.url, "policy not active, passing request through");
            let response = self.network.fetch(&request).await?;
            return Ok(Intercepted { strategy: None, source: Source::Network, response });
        }

        match classify(&request, &self.api_prefix) {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
        }
    }

    /// Wait for every detached task spawned so far.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::replace(&mut *self.background(), JoinSet::new());
            if tasks.is_empty() {
                break;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "background cache task failed to complete");
                }
            }
        }
    }

    fn detach<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.background();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    fn background(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.background.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
