// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-git: thin, synchronous-contract wrappers for `clone`,
//! `worktree add/move/remove`, and branch ops.

pub mod error;
mod ops;
mod subprocess;

pub use error::GitError;
pub use ops::{
    clone, commit_all, configure_pull_rebase, configure_safe_directory, current_branch,
    current_commit, delete_branch, fetch_all_prune, is_detached, is_git_repo, pull_rebase, push,
    rebase_current, rev_parse, set_remote_url, worktree_add, worktree_move, worktree_remove,
};
pub use subprocess::{SubprocessError, GIT_NETWORK_TIMEOUT, GIT_TIMEOUT};
