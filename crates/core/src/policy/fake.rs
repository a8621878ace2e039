//! Scripted network and policy builders for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use super::{CachePolicy, InterceptedRequest, Network, PolicyOptions};
use crate::Error;
use crate::cache::{CacheStorage, Response};
use crate::config::AppConfig;

pub const ORIGIN: &str = "http://localhost:5173";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

/// Network double answering from a path -> (status, body) table.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: AtomicBool,
    calls: AtomicUsize,
    stall: Mutex<Option<Arc<Notify>>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(path.to_string(), (status, body.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every fetch wait until the returned handle is notified.
    pub fn stall(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.stall.lock().unwrap() = Some(notify.clone());
        notify
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let stall = self.stall.lock().unwrap().clone();
        if let Some(notify) = stall {
            notify.notified().await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkFailed(format!("offline: {}", request.url)));
        }

        let route = self.routes.lock().unwrap().get(request.url.path()).cloned();
        let (status, body) = route.unwrap_or((404, "not found".to_string()));
        Ok(Response::new(request.url.as_str(), status, body).with_header("content-type", "text/plain"))
    }
}

pub fn policy_with(storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> CachePolicy {
    let options = PolicyOptions::from_config(&AppConfig::default()).unwrap();
    CachePolicy::new(storage, network, options).unwrap()
}

/// A policy already installed and activated.
pub async fn active_policy(storage: Arc<dyn CacheStorage>, network: Arc<FakeNetwork>) -> CachePolicy {
    for path in ["/", "/index.html", "/src/main.tsx", "/manifest.json"] {
        network.respond(path, 200, path);
    }
    let policy = policy_with(storage, network);
    policy.install().await.unwrap();
    policy.activate().await.unwrap();
    policy
}
