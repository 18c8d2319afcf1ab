// SPDX-License-Identifier: Apache-2.0

//! The pure [`InstallationToken`] record and its expiry rule.
//!
//! `codeagent-credentials::CredentialManager` owns minting, exchange, caching
//! and the refresh loop; this module only carries the value and the
//! expiry predicate so it can be unit-tested without any I/O.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A token is considered expired once fewer than this much time remains.
pub const EXPIRY_SKEW: Duration = Duration::from_secs(5 * 60);

/// Short-lived bearer token for the platform, issued in app-installation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    /// Seconds since the epoch. Zero is a sentinel meaning "never expires",
    /// used only by synthetic/test fixtures (see [`InstallationToken::is_expired`]).
    pub expires_at: u64,
    pub installation_id: i64,
}

impl InstallationToken {
    pub fn new(token: impl Into<String>, expires_at: u64, installation_id: i64) -> Self {
        Self { token: token.into(), expires_at, installation_id }
    }

    /// `true` once `now + 5min >= expires_at`. A zero `expires_at` is treated
    /// as non-expiring, so synthetic/test fixtures can mint a token without
    /// picking a real expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        if self.expires_at == 0 {
            return false;
        }
        now.saturating_add(EXPIRY_SKEW.as_secs()) >= self.expires_at
    }

    /// Whether this token needs a refresh within `threshold` from now —
    /// looser than [`InstallationToken::is_expired`], used by the background
    /// refresh loop to renew before callers would actually observe expiry.
    pub fn needs_refresh(&self, now: u64, threshold: Duration) -> bool {
        if self.expires_at == 0 {
            return false;
        }
        now.saturating_add(threshold.as_secs()) >= self.expires_at
    }
}

/// Seconds-since-epoch helper, kept here so callers don't each reach for
/// `SystemTime` directly.
pub fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
