// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-credentials: JWT minting, installation-token exchange, caching
//! and background refresh for the platform's app-auth flow.

mod cache;
mod exchange;
pub mod error;
mod jwt;
mod manager;

pub use cache::{RefreshStats, TokenCache};
pub use error::CredentialError;
pub use exchange::ExchangeScope;
pub use jwt::Claims;
pub use manager::{
    AppIdentity, AuthMode, CredentialManager, RefreshConfig, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_REFRESH_INTERVAL, DEFAULT_REFRESH_THRESHOLD,
};
