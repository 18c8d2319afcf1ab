// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-platform: the platform REST operations the core consumes.
//! The platform's own REST/GraphQL client is out of scope here;
//! [`PlatformClient`] is the contract seam, [`GithubClient`] a
//! thin real implementation, and [`FakePlatformClient`] (under
//! `test-support`) an in-memory double for the rest of the workspace's tests.

mod client;
pub mod error;
mod github;
mod types;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use client::PlatformClient;
pub use error::PlatformError;
pub use github::{GithubClient, TokenSource};
pub use types::{HistoryEntry, IssueComment, PrDetails, PrState, Review, ReviewComment};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePlatformClient;
