//! Client code for mcp-offline.
//!
//! This crate provides the reqwest-backed network capability that the cache
//! policy fetches through.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
