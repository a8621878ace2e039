//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and pruning the named stores.

pub mod get;
pub mod purge;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use purge::{CachePurgeParams, purge_impl};
pub use stores::stores_impl;
