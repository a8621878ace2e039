//! Named response stores.
//!
//! This module provides the store capability used by the policy, with two
//! implementations:
//!
//! - [`CacheDb`]: persistent SQLite storage via tokio-rusqlite, with automatic
//!   schema migrations and WAL mode for concurrent access
//! - [`MemoryStorage`]: in-process storage with the same semantics
//!
//! Entries are addressed by a SHA-256 digest of the request method and URL.

pub mod connection;
pub mod entries;
pub mod key;
pub mod memory;
pub mod migrations;
pub mod response;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntry;
pub use key::RequestKey;
pub use memory::MemoryStorage;
pub use response::Response;
pub use storage::CacheStorage;
pub use stores::StoreSummary;
