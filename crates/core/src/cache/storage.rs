//! The store capability consumed by the policy.

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entries::CacheEntry;
use super::key::RequestKey;
use super::response::Response;
use super::stores::StoreSummary;
use crate::Error;

/// Named, persistent request -> response stores.
///
/// Implementations must only accept GET keys in [`CacheStorage::put`] and
/// must miss on every non-GET lookup.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if missing.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Store names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a whole store. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<Response>, Error>;

    /// Search every store, oldest first.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<Response>, Error>;

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error>;

    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, Error>;

    async fn summaries(&self) -> Result<Vec<StoreSummary>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.match_entry(name, key).await
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.match_any_entry(key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.put_entry(name, key, response).await
    }

    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, Error> {
        self.list_entries(name).await
    }

    async fn summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.store_summaries().await
    }
}
