// SPDX-License-Identifier: Apache-2.0

//! Token cache keyed by installation id, plus the refresh-loop statistics
//! counters — both live under the same lock.

use codeagent_core::InstallationToken;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub total_refreshes: u64,
    pub total_failures: u64,
    pub last_run_secs: u64,
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<i64, InstallationToken>,
    stats: RefreshStats,
}

/// Concurrency-safe `installation id -> token` mapping. Reads take the
/// shared lock; set/delete/clear take the writer lock.
#[derive(Default)]
pub struct TokenCache {
    inner: RwLock<Inner>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, installation_id: i64) -> Option<InstallationToken> {
        self.inner.read().tokens.get(&installation_id).cloned()
    }

    pub fn set(&self, token: InstallationToken) {
        self.inner.write().tokens.insert(token.installation_id, token);
    }

    pub fn delete(&self, installation_id: i64) {
        self.inner.write().tokens.remove(&installation_id);
    }

    pub fn clear(&self) {
        self.inner.write().tokens.clear();
    }

    /// Tokens whose `needs_refresh(now, threshold)` is true.
    pub fn due_for_refresh(&self, now: u64, threshold: std::time::Duration) -> Vec<InstallationToken> {
        self.inner
            .read()
            .tokens
            .values()
            .filter(|t| t.needs_refresh(now, threshold))
            .cloned()
            .collect()
    }

    /// Removes tokens already past expiry (ignoring the 5-minute skew used
    /// by `is_expired`, since a pruned token is gone regardless).
    pub fn prune_expired(&self, now: u64) {
        self.inner.write().tokens.retain(|_, t| t.expires_at == 0 || t.expires_at > now);
    }

    pub fn record_refresh(&self, now: u64, succeeded: bool) {
        let mut inner = self.inner.write();
        inner.stats.total_refreshes += 1;
        if !succeeded {
            inner.stats.total_failures += 1;
        }
        inner.stats.last_run_secs = now;
    }

    pub fn stats(&self) -> RefreshStats {
        self.inner.read().stats.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
