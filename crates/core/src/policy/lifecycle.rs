//! Install and activate phases.

use std::sync::{MutexGuard, PoisonError};

use schemars::JsonSchema;
use serde::Serialize;

use super::CachePolicy;
use super::request::{Destination, InterceptedRequest};
use crate::Error;

/// Lifecycle phase of a policy version. Transitions are linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Registered,
    Installed,
    Active,
}

/// Phase plus the signals raised on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct LifecycleState {
    pub phase: Phase,
    /// Set when install finished: supersede the old version without waiting.
    pub skip_waiting: bool,
    /// Set when activation finished: control existing contexts immediately.
    pub claimed: bool,
}

impl CachePolicy {
    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expect_phase(&self, expected: Phase, action: &str) -> Result<(), Error> {
        let phase = self.state().phase;
        if phase != expected {
            return Err(Error::Lifecycle(format!("cannot {action} in phase {phase:?}")));
        }
        Ok(())
    }

    /// Precache the manifest into the static store.
    ///
    /// All manifest responses are fetched before anything is written. Any
    /// network failure or non-200 status fails the whole install and leaves
    /// the policy `Registered`. Returns the number of cached paths.
    pub async fn install(&self) -> Result<usize, Error> {
        self.expect_phase(Phase::Registered, "install")?;

        let store = &self.names.static_assets;
        self.storage.open(store).await?;

        let mut fetched = Vec::with_capacity(self.manifest.len());
        for url in &self.manifest {
            let request = InterceptedRequest::get(url.clone()).with_destination(Destination::guess_from_path(url.path()));
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;

            if !response.is_cacheable() {
                return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
            }
            fetched.push((request.key(), response));
        }

        for (key, response) in &fetched {
            self.storage
                .put(store, key, response)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", key.url)))?;
        }

        {
            let mut state = self.lock_state();
            state.phase = Phase::Installed;
            state.skip_waiting = true;
        }
        tracing::info!(store = %store, cached = fetched.len(), "install complete, skipping wait");

        Ok(fetched.len())
    }

    /// Take control with the precache left by an earlier run of this version.
    ///
    /// For use after a failed [`CachePolicy::install`]: when the static store
    /// already holds entries the policy activates over them and returns
    /// `true`. Otherwise it stays `Registered` and returns `false`.
    pub async fn resume(&self) -> Result<bool, Error> {
        self.expect_phase(Phase::Registered, "resume")?;

        let store = &self.names.static_assets;
        if !self.storage.keys().await?.contains(store) {
            return Ok(false);
        }
        let cached = self.storage.entries(store).await?.len();
        if cached == 0 {
            return Ok(false);
        }

        self.lock_state().phase = Phase::Installed;
        tracing::info!(store = %store, cached, "resuming from existing precache");

        self.activate().await?;
        Ok(true)
    }

    /// Delete every store outside the allow-list and take control.
    ///
    /// Returns the names of the deleted stores.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.expect_phase(Phase::Installed, "activate")?;

        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if self.names.contains(&name) {
                continue;
            }
            if self.storage.delete(&name).await? {
                tracing::info!(store = %name, "deleted stale store");
                deleted.push(name);
            }
        }

        {
            let mut state = self.lock_state();
            state.phase = Phase::Active;
            state.claimed = true;
        }
        tracing::info!(deleted = deleted.len(), "activation complete, claiming clients");

        Ok(deleted)
    }
}
