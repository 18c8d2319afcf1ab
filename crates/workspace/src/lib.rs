// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-workspace: the repo cache and workspace manager.

pub mod error;
pub mod manager;
pub mod repo_cache;

pub use error::WorkspaceError;
pub use manager::{ContainerCleanup, IssueRef, NoopContainerCleanup, PrRef, WorkspaceManager};
pub use repo_cache::RepoCache;
