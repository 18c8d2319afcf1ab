// SPDX-License-Identifier: Apache-2.0

//! `CredentialManager` — mints JWTs, exchanges installation tokens, caches
//! and refreshes them in the background.

use crate::cache::{RefreshStats, TokenCache};
use crate::error::CredentialError;
use crate::exchange::{self, ExchangeScope};
use crate::jwt;
use codeagent_core::{now_secs, InstallationToken};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// App identity used to mint JWTs and exchange installation tokens.
#[derive(Clone)]
pub struct AppIdentity {
    pub app_id: i64,
    pub private_key_pem: Arc<Vec<u8>>,
}

/// Personal-token and app-installation modes are alternates, chosen at
/// construction and fixed for the client's lifetime.
#[derive(Clone)]
pub enum AuthMode {
    PersonalToken(Arc<str>),
    AppInstallation(AppIdentity),
}

pub struct RefreshConfig {
    pub interval: Duration,
    pub threshold: Duration,
    pub max_concurrency: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            threshold: DEFAULT_REFRESH_THRESHOLD,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

pub struct CredentialManager {
    mode: AuthMode,
    base_url: String,
    client: reqwest::Client,
    cache: TokenCache,
    config: RefreshConfig,
    shutdown: AtomicBool,
}

impl CredentialManager {
    pub fn new(mode: AuthMode) -> Self {
        Self::with_config(mode, RefreshConfig::default())
    }

    pub fn with_config(mode: AuthMode, config: RefreshConfig) -> Self {
        Self {
            mode,
            base_url: exchange::DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            cache: TokenCache::new(),
            config,
            shutdown: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns a usable bearer credential for `installation_id` (ignored in
    /// personal-token mode). In app mode, returns the cached token if fresh,
    /// otherwise mints a JWT and exchanges it, caching the result unless
    /// `scope` requests a scoped token (never cached, per spec).
    pub async fn token_for(
        &self,
        installation_id: Option<i64>,
        scope: &ExchangeScope,
    ) -> Result<String, CredentialError> {
        match (&self.mode, installation_id) {
            (AuthMode::PersonalToken(token), _) => Ok(token.to_string()),
            (AuthMode::AppInstallation(_), None) => {
                Err(CredentialError::InvalidInstallationId(0))
            }
            (AuthMode::AppInstallation(identity), Some(id)) => {
                if scope.is_empty() {
                    if let Some(cached) = self.cache.get(id) {
                        if !cached.is_expired(now_secs()) {
                            return Ok(cached.token);
                        }
                    }
                }
                let token = self.exchange_for(identity, id, scope).await?;
                if scope.is_empty() {
                    self.cache.set(token.clone());
                }
                Ok(token.token)
            }
        }
    }

    async fn exchange_for(
        &self,
        identity: &AppIdentity,
        installation_id: i64,
        scope: &ExchangeScope,
    ) -> Result<InstallationToken, CredentialError> {
        let jwt = jwt::mint(identity.app_id, &identity.private_key_pem, now_secs() as i64)?;
        exchange::exchange(&self.client, &self.base_url, &jwt, installation_id, scope).await
    }

    pub fn stats(&self) -> RefreshStats {
        self.cache.stats()
    }

    /// One refresh cycle: prune tokens already past expiry, then
    /// re-exchange every token within `threshold` of expiring, bounded by
    /// `max_concurrency` concurrent exchanges.
    pub async fn refresh_now(&self) {
        let AuthMode::AppInstallation(identity) = &self.mode else {
            return;
        };
        let now = now_secs();
        self.cache.prune_expired(now);

        let due = self.cache.due_for_refresh(now, self.config.threshold);
        if due.is_empty() {
            self.cache.record_refresh(now, true);
            return;
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = Vec::with_capacity(due.len());
        for stale in due {
            let semaphore = semaphore.clone();
            let identity = identity.clone();
            let client = self.client.clone();
            let base_url = self.base_url.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let jwt = jwt::mint(identity.app_id, &identity.private_key_pem, now_secs() as i64)?;
                tokio::time::timeout(
                    Duration::from_secs(30),
                    exchange::exchange(
                        &client,
                        &base_url,
                        &jwt,
                        stale.installation_id,
                        &ExchangeScope::default(),
                    ),
                )
                .await
                .map_err(|_| CredentialError::ExchangeFailed {
                    status: 0,
                    body: "refresh timed out".into(),
                })?
            }));
        }

        let mut any_failure = false;
        for task in tasks {
            match task.await {
                Ok(Ok(token)) => self.cache.set(token),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "token refresh failed");
                    any_failure = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh task panicked");
                    any_failure = true;
                }
            }
        }
        self.cache.record_refresh(now_secs(), !any_failure);
    }

    /// Spawns the periodic refresh loop. The returned handle should be kept
    /// alive; dropping it does not stop the loop — call [`Self::shutdown`]
    /// first.
    pub fn spawn_refresh_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            loop {
                ticker.tick().await;
                if self.shutdown.load(Ordering::Acquire) {
                    break;
                }
                self.refresh_now().await;
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
