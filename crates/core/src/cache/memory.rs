//! In-process store implementation.
//!
//! Mirrors the SQLite store's semantics without persistence.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::entries::CacheEntry;
use super::key::RequestKey;
use super::response::Response;
use super::storage::CacheStorage;
use super::stores::StoreSummary;
use crate::Error;

#[derive(Debug)]
struct StoredEntry {
    key: RequestKey,
    response: Response,
    stored_at: String,
}

#[derive(Debug)]
struct MemoryStore {
    name: String,
    entries: HashMap<String, StoredEntry>,
}

/// Stores kept in a mutex-guarded vector, in creation order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stores: Mutex<Vec<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MemoryStore>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_or_create<'a>(stores: &'a mut Vec<MemoryStore>, name: &str) -> &'a mut MemoryStore {
    let index = match stores.iter().position(|s| s.name == name) {
        Some(index) => index,
        None => {
            stores.push(MemoryStore { name: name.to_string(), entries: HashMap::new() });
            stores.len() - 1
        }
    };
    &mut stores[index]
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        find_or_create(&mut self.lock(), name);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock().iter().map(|s| s.name.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let mut stores = self.lock();
        let before = stores.len();
        stores.retain(|s| s.name != name);
        Ok(stores.len() != before)
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        if !key.is_get() {
            return Ok(None);
        }
        let hash = key.hash();
        Ok(self
            .lock()
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.entries.get(&hash))
            .map(|e| e.response.clone()))
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        if !key.is_get() {
            return Ok(None);
        }
        let hash = key.hash();
        Ok(self
            .lock()
            .iter()
            .find_map(|s| s.entries.get(&hash))
            .map(|e| e.response.clone()))
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        if !key.is_get() {
            return Err(Error::UnsupportedMethod(key.method.clone()));
        }
        let entry = StoredEntry { key: key.clone(), response: response.clone(), stored_at: Utc::now().to_rfc3339() };
        find_or_create(&mut self.lock(), name).entries.insert(key.hash(), entry);
        Ok(())
    }

    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, Error> {
        let stores = self.lock();
        let Some(store) = stores.iter().find(|s| s.name == name) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<CacheEntry> = store
            .entries
            .values()
            .map(|e| CacheEntry {
                store: store.name.clone(),
                method: e.key.method.clone(),
                url: e.key.url.clone(),
                status: e.response.status,
                body_size: e.response.body.len() as u64,
                stored_at: e.stored_at.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.stored_at.cmp(&b.stored_at).then_with(|| a.url.cmp(&b.url)));
        Ok(entries)
    }

    async fn summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        Ok(self
            .lock()
            .iter()
            .map(|s| StoreSummary {
                name: s.name.clone(),
                entries: s.entries.len() as u64,
                total_bytes: s.entries.values().map(|e| e.response.body.len() as u64).sum(),
            })
            .collect())
    }
}
