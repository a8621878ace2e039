//! Core types and shared functionality for mcp-offline.
//!
//! This crate provides:
//! - Named response stores with SQLite and in-memory backends
//! - The request cache policy (install, activate, intercept)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;

pub use cache::{CacheDb, CacheStorage, MemoryStorage, RequestKey, Response};
pub use config::{AppConfig, StoreNames};
pub use error::Error;
pub use policy::{CachePolicy, Intercepted, InterceptedRequest, Network, PolicyOptions};
