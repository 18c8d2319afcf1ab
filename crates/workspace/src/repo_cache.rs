// SPDX-License-Identifier: Apache-2.0

//! Maintains `{base}/_cache/{org}/{repo}` mirrors and produces cheap derived
//! checkouts.
//!
//! The cache never blocks a caller on an in-flight update: a process-wide
//! "repo-being-updated" set means a caller arriving while another task is
//! updating the same `(org, repo)` observes the cache as-is rather than
//! waiting for the update to finish; see DESIGN.md for why this is kept
//! rather than turned into a blocking lock.

use crate::error::WorkspaceError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct RepoCache {
    base_dir: PathBuf,
    updating: Arc<Mutex<HashSet<(String, String)>>>,
}

impl RepoCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), updating: Arc::new(Mutex::new(HashSet::new())) }
    }

    pub fn cache_path(&self, org: &str, repo: &str) -> PathBuf {
        self.base_dir.join("_cache").join(org).join(repo)
    }

    /// Returns the cached mirror path for `(org, repo)`, cloning it fresh if
    /// absent or attempting an update (fetch + rebase) if present. Per spec,
    /// the path is returned even when the update attempt fails.
    pub async fn get_or_create(
        &self,
        url: &str,
        org: &str,
        repo: &str,
    ) -> Result<PathBuf, WorkspaceError> {
        let path = self.cache_path(org, repo);
        if codeagent_git::is_git_repo(&path) {
            self.try_update(&path, org, repo).await;
            return Ok(path);
        }

        if let Err(e) = codeagent_git::clone(url, &path, None, false).await {
            let _ = tokio::fs::remove_dir_all(&path).await;
            return Err(e.into());
        }
        Ok(path)
    }

    /// Attempt a fetch+rebase of the mirror at `path`, skipping entirely if
    /// another task is already updating the same `(org, repo)`.
    async fn try_update(&self, path: &Path, org: &str, repo: &str) {
        let key = (org.to_string(), repo.to_string());
        {
            let mut updating = self.updating.lock();
            if !updating.insert(key.clone()) {
                tracing::debug!(org, repo, "cache update already in flight, skipping");
                return;
            }
        }

        let _ = clear_stale_index_lock(path).await;
        if let Err(e) = codeagent_git::fetch_all_prune(path).await {
            tracing::warn!(org, repo, error = %e, "cache fetch failed");
        } else if let Err(e) = codeagent_git::rebase_current(path).await {
            tracing::warn!(org, repo, error = %e, "cache rebase failed");
        }

        self.updating.lock().remove(&key);
    }

    /// Clone from the local mirror to produce a working tree quickly, then
    /// rewrite `origin` to the real remote so pushes go upstream.
    pub async fn clone_from(
        &self,
        cached_path: &Path,
        target_path: &Path,
        branch: &str,
        origin_url: &str,
        create_new: bool,
    ) -> Result<(), WorkspaceError> {
        codeagent_git::worktree_add(cached_path, target_path, branch, create_new).await?;
        codeagent_git::set_remote_url(target_path, origin_url).await?;
        codeagent_git::configure_safe_directory(target_path).await;
        codeagent_git::configure_pull_rebase(target_path).await;
        Ok(())
    }
}

/// Best-effort removal of a stale `.git/index.lock` left by a crashed fetch,
/// so the retry below doesn't spuriously fail on a lock nothing still holds.
async fn clear_stale_index_lock(path: &Path) -> std::io::Result<()> {
    let lock = path.join(".git").join("index.lock");
    match tokio::fs::remove_file(&lock).await {
        Ok(()) => {
            tracing::warn!(path = %lock.display(), "removed stale index.lock before retry");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "repo_cache_tests.rs"]
mod tests;
