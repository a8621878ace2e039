//! The three response strategies.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::classify::Strategy;
use super::request::InterceptedRequest;
use super::{CachePolicy, Intercepted};
use crate::Error;
use crate::cache::{RequestKey, Response};

impl CachePolicy {
    /// Store read that treats a failing store as a miss.
    async fn lookup(&self, store: &str, key: &RequestKey) -> Option<Response> {
        match self.storage.match_in(store, key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(store = %store, url = %key.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Write a snapshot without blocking the response.
    fn store_detached(&self, store: String, key: RequestKey, response: Response) {
        let storage = Arc::clone(&self.storage);
        self.detach(async move {
            if let Err(e) = storage.put(&store, &key, &response).await {
                tracing::debug!(store = %store, url = %key.url, error = %e, "background cache write dropped");
            }
        });
    }

    /// Static store first; on a miss fetch and cache a 200 in the background.
    pub(super) async fn cache_first(&self, request: InterceptedRequest) -> Result<Intercepted, Error> {
        let key = request.key();
        let store = &self.names.static_assets;

        if let Some(cached) = self.lookup(store, &key).await {
            tracing::debug!(url = %key.url, "cache-first hit");
            return Ok(Intercepted::from_cache(Strategy::CacheFirst, cached));
        }

        let response = self.network.fetch(&request).await?;
        if response.is_cacheable() {
            self.store_detached(store.clone(), key, response.clone());
        }

        Ok(Intercepted::from_network(Strategy::CacheFirst, response))
    }

    /// Answer a GET from the API store when possible while the network
    /// refreshes the entry; otherwise wait for the network.
    pub(super) async fn stale_while_revalidate(&self, request: InterceptedRequest) -> Result<Intercepted, Error> {
        let store = self.names.api.clone();
        if let Err(e) = self.storage.open(&store).await {
            tracing::warn!(store = %store, error = %e, "failed to open api store");
        }

        let key = request.key();
        let is_get = request.is_get();
        let cached = self.lookup(&store, &key).await;

        let (tx, rx) = oneshot::channel();
        let storage = Arc::clone(&self.storage);
        let network = Arc::clone(&self.network);
        self.detach(async move {
            let result = network.fetch(&request).await;
            let snapshot = match &result {
                Ok(response) if is_get && response.is_cacheable() => Some(response.clone()),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(url = %key.url, error = %e, "revalidation fetch failed");
                    None
                }
            };

            // The caller may already have its answer from the store.
            let _ = tx.send(result);

            if let Some(response) = snapshot
                && let Err(e) = storage.put(&store, &key, &response).await
            {
                tracing::debug!(store = %store, url = %key.url, error = %e, "revalidation write dropped");
            }
        });

        if is_get && let Some(cached) = cached {
            tracing::debug!(url = %cached.url, "serving stale api response");
            return Ok(Intercepted::from_cache(Strategy::StaleWhileRevalidate, cached));
        }

        let response = rx
            .await
            .map_err(|_| Error::NetworkFailed("revalidation task ended without a result".into()))??;

        Ok(Intercepted::from_network(Strategy::StaleWhileRevalidate, response))
    }

    /// Network first; on failure fall back to any store.
    pub(super) async fn network_first(&self, request: InterceptedRequest) -> Result<Intercepted, Error> {
        let err = match self.network.fetch(&request).await {
            Ok(response) => return Ok(Intercepted::from_network(Strategy::NetworkFirst, response)),
            Err(e) => e,
        };

        let key = request.key();
        match self.storage.match_any(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(url = %key.url, error = %err, "network failed, serving cached copy");
                Ok(Intercepted::from_cache(Strategy::NetworkFirst, cached))
            }
            Ok(None) => Err(err),
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "fallback lookup failed");
                Err(err)
            }
        }
    }
}
