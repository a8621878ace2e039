//! Request-addressed cache keys.

use sha2::{Digest, Sha256};

/// The identity of a request inside a store: method plus canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Build a key, normalizing the method to upper case.
    pub fn new(method: &str, url: &url::Url) -> Self {
        Self { method: method.to_ascii_uppercase(), url: url.as_str().to_string() }
    }

    /// Shorthand for a GET key.
    pub fn get(url: &url::Url) -> Self {
        Self::new("GET", url)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Hex digest used as the primary key inside a store.
    pub fn hash(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

/// Compute the cache key digest for a method and canonical URL.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
