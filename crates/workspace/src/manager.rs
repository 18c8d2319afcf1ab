// SPDX-License-Identifier: Apache-2.0

//! `WorkspaceManager` — allocates, tracks, moves and reclaims Workspaces
//!

use crate::error::WorkspaceError;
use crate::repo_cache::RepoCache;
use async_trait::async_trait;
use codeagent_core::naming;
use codeagent_core::{Assistant, Clock, RepoCoord, SystemClock, Workspace, WorkspaceKey, WorkspaceKind};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// The subset of an issue the manager needs to materialize a workspace for
/// it. `url` is the issue's platform URL, used to derive `(org, repo)` per
/// allocates, tracks, moves and reclaims Workspaces.
#[derive(Debug, Clone)]
pub struct IssueRef {
    pub url: String,
    pub number: u64,
    pub remote_url: String,
}

/// The subset of a pull request the manager needs.
#[derive(Debug, Clone)]
pub struct PrRef {
    pub org: String,
    pub repo: String,
    pub number: u64,
    pub head_ref: String,
    pub remote_url: String,
}

impl PrRef {
    fn repo_coord(&self) -> RepoCoord {
        RepoCoord::new(self.org.clone(), self.repo.clone())
    }
}

/// Parses `(org, repo)` out of a platform issue URL of the form
/// `https://host/{org}/{repo}/issues/{n}`.
fn repo_from_issue_url(url: &str) -> Result<RepoCoord, WorkspaceError> {
    let err = || WorkspaceError::MalformedRepoUrl { what: "org/repo", url: url.to_string() };
    let trimmed = url.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.rsplitn(4, '/').collect();
    // rsplitn(4, '/') on ".../{org}/{repo}/issues/{n}" yields [n, "issues", repo, org]
    if segments.len() < 4 || segments[1] != "issues" {
        return Err(err());
    }
    Ok(RepoCoord::new(segments[3].to_string(), segments[2].to_string()))
}

/// Evicts a named container, per the cleanup contract. The
/// platform's actual container runtime is a non-goal; this is the seam the
/// core calls through.
#[async_trait]
pub trait ContainerCleanup: Send + Sync {
    async fn remove(&self, name: &str);
}

pub struct NoopContainerCleanup;

#[async_trait]
impl ContainerCleanup for NoopContainerCleanup {
    async fn remove(&self, _name: &str) {}
}

pub struct WorkspaceManager<C: Clock = SystemClock> {
    base_dir: PathBuf,
    cache: RepoCache,
    registry: Arc<RwLock<HashMap<WorkspaceKey, Workspace>>>,
    clock: C,
    containers: Arc<dyn ContainerCleanup>,
    task_locks: Mutex<HashMap<WorkspaceKey, Arc<AsyncMutex<()>>>>,
}

impl WorkspaceManager<SystemClock> {
    pub fn new(base_dir: impl Into<PathBuf>, cache: RepoCache) -> Self {
        Self::with_clock(base_dir, cache, SystemClock)
    }
}

impl<C: Clock> WorkspaceManager<C> {
    pub fn with_clock(base_dir: impl Into<PathBuf>, cache: RepoCache, clock: C) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache,
            registry: Arc::new(RwLock::new(HashMap::new())),
            clock,
            containers: Arc::new(NoopContainerCleanup),
            task_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the serializing lock for `key`'s end-to-end task, creating
    /// it on first use. Held for the whole mutating flow against a
    /// Workspace — a handler's git/session/platform calls never interleave
    /// with another task against the same Workspace.
    pub async fn lock_task(&self, key: WorkspaceKey) -> OwnedMutexGuard<()> {
        let lock = self.task_locks.lock().entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone();
        lock.lock_owned().await
    }

    pub fn with_container_cleanup(mut self, containers: Arc<dyn ContainerCleanup>) -> Self {
        self.containers = containers;
        self
    }

    fn now_secs(&self) -> u64 {
        self.clock.epoch_ms() / 1000
    }

    fn org_dir(&self, org: &str) -> PathBuf {
        self.base_dir.join(org)
    }

    /// Derives `(org, repo)` from the issue URL, ensures the repo cache, and
    /// creates a worktree at `{base}/{org}/{issueDir(...)}` on a new branch
    /// `codeagent/{assistant}/issue-{n}-{ts}`.
    pub async fn create_from_issue(
        &self,
        issue: &IssueRef,
        assistant: Assistant,
    ) -> Result<Workspace, WorkspaceError> {
        let repo = repo_from_issue_url(&issue.url)?;
        let ts = self.now_secs();
        let branch = format!("codeagent/{}/issue-{}-{}", assistant.as_str(), issue.number, ts);
        let dir_name = naming::issue_dir(assistant.as_str(), &repo.repo, issue.number, ts);
        let path = self.org_dir(&repo.org).join(&dir_name);

        let cached_path = self.cache.get_or_create(&issue.remote_url, &repo.org, &repo.repo).await?;
        self.cache.clone_from(&cached_path, &path, &branch, &issue.remote_url, true).await?;

        let ws = Workspace {
            key: WorkspaceKey::issue(assistant, repo, issue.number),
            path,
            branch,
            session_path: None,
            remote_url: issue.remote_url.clone(),
            created_at: ts,
        };
        self.register_workspace(ws.clone());
        Ok(ws)
    }

    /// Renames the working tree from an issue directory to a PR directory
    /// and re-registers it under the PR identity. The git branch is
    /// unchanged.
    pub async fn move_issue_to_pr(
        &self,
        ws: &Workspace,
        pr_number: u64,
    ) -> Result<Workspace, WorkspaceError> {
        let ts = ws.created_at;
        let assistant = ws.key.assistant;
        let repo = ws.key.repo.clone();
        let new_name = naming::pr_dir(assistant.as_str(), &repo.repo, pr_number, ts);
        let new_path = self.org_dir(&repo.org).join(&new_name);
        let cached_path = self.cache.cache_path(&repo.org, &repo.repo);

        codeagent_git::worktree_move(&cached_path, &ws.path, &new_path).await?;

        let moved = Workspace {
            key: WorkspaceKey::pr(assistant, repo, pr_number),
            path: new_path,
            branch: ws.branch.clone(),
            session_path: ws.session_path.clone(),
            remote_url: ws.remote_url.clone(),
            created_at: ws.created_at,
        };

        self.registry.write().remove(&ws.key);
        self.register_workspace(moved.clone());
        Ok(moved)
    }

    /// Ensures the repo cache, then creates a worktree checking out the PR's
    /// head ref (non-creating) and a session directory alongside it.
    pub async fn create_from_pr(
        &self,
        pr: &PrRef,
        assistant: Assistant,
    ) -> Result<Workspace, WorkspaceError> {
        let ts = self.now_secs();
        let dir_name = naming::pr_dir(assistant.as_str(), &pr.repo, pr.number, ts);
        let org_dir = self.org_dir(&pr.org);
        let path = org_dir.join(&dir_name);

        let cached_path = self.cache.get_or_create(&pr.remote_url, &pr.org, &pr.repo).await?;
        self.cache.clone_from(&cached_path, &path, &pr.head_ref, &pr.remote_url, false).await?;

        let session_path =
            self.create_session_path(&org_dir, assistant, &pr.repo, pr.number, &ts.to_string())?;

        let ws = Workspace {
            key: WorkspaceKey::pr(assistant, pr.repo_coord(), pr.number),
            path,
            branch: pr.head_ref.clone(),
            session_path: Some(session_path),
            remote_url: pr.remote_url.clone(),
            created_at: ts,
        };
        self.register_workspace(ws.clone());
        Ok(ws)
    }

    /// Returns the registered workspace for `(assistant, pr)` if it passes
    /// validation, otherwise cleans it up and creates a fresh one.
    pub async fn get_or_create_for_pr(
        &self,
        pr: &PrRef,
        assistant: Assistant,
    ) -> Result<Workspace, WorkspaceError> {
        let key = WorkspaceKey::pr(assistant, pr.repo_coord(), pr.number);
        let existing = self.registry.read().get(&key).cloned();

        if let Some(ws) = existing {
            if self.validate(&ws, &pr.head_ref).await {
                return Ok(ws);
            }
            tracing::warn!(key = %ws.key, "workspace failed validation, recreating");
            self.cleanup_workspace(&ws).await;
        }

        self.create_from_pr(pr, assistant).await
    }

    /// Step 2 of the validation algorithm: path exists; current branch
    /// matches, or `HEAD` is detached at the tip of `origin/{head_ref}`.
    async fn validate(&self, ws: &Workspace, head_ref: &str) -> bool {
        if !ws.path.exists() {
            return false;
        }
        match codeagent_git::current_branch(&ws.path).await {
            Ok(branch) if branch == head_ref => true,
            _ => {
                let head = codeagent_git::current_commit(&ws.path).await;
                let origin_tip =
                    codeagent_git::rev_parse(&ws.path, &format!("origin/{head_ref}")).await;
                matches!((head, origin_tip), (Ok(h), Ok(o)) if h == o)
            }
        }
    }

    pub fn create_session_path(
        &self,
        parent: &Path,
        assistant: Assistant,
        repo: &str,
        n: u64,
        suffix: &str,
    ) -> Result<PathBuf, WorkspaceError> {
        let ts: u64 = suffix.parse().unwrap_or_else(|_| self.now_secs());
        let name = naming::session_dir(assistant.as_str(), repo, n, ts);
        let path = parent.join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Idempotent insert under the identity key; overwriting an existing
    /// entry is a logged warning, not an error.
    pub fn register_workspace(&self, ws: Workspace) {
        let mut registry = self.registry.write();
        if registry.contains_key(&ws.key) {
            tracing::warn!(key = %ws.key, "overwriting already-registered workspace");
        }
        registry.insert(ws.key.clone(), ws);
    }

    pub fn lookup(&self, key: &WorkspaceKey) -> Option<Workspace> {
        self.registry.read().get(key).cloned()
    }

    /// Number of currently-registered workspaces, for the `/healthz` surface.
    pub fn workspace_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Deregisters, removes the worktree and session directory, and invokes
    /// the container cleanup contract. Returns `true` only when both the
    /// tree and the session directory are confirmed gone.
    pub async fn cleanup_workspace(&self, ws: &Workspace) -> bool {
        self.registry.write().remove(&ws.key);

        let cached_path = self.cache.cache_path(&ws.key.repo.org, &ws.key.repo.repo);
        let worktree_ok = match codeagent_git::worktree_remove(&cached_path, &ws.path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %ws.key, error = %e, "worktree removal failed");
                let _ = tokio::fs::remove_dir_all(&ws.path).await;
                !ws.path.exists()
            }
        };

        let session_ok = if let Some(session_path) = &ws.session_path {
            match tokio::fs::remove_dir_all(session_path).await {
                Ok(()) => true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
                Err(e) => {
                    tracing::warn!(key = %ws.key, error = %e, "session dir removal failed");
                    false
                }
            }
        } else {
            true
        };

        for container in container_names(ws) {
            self.containers.remove(&container).await;
        }

        worktree_ok && session_ok
    }

    /// Workspaces older than `cleanup_after`.
    pub fn get_expired(&self, cleanup_after: Duration) -> Vec<Workspace> {
        let now = self.now_secs();
        self.registry
            .read()
            .values()
            .filter(|ws| ws.age_secs(now) > cleanup_after.as_secs())
            .cloned()
            .collect()
    }

    /// All workspaces registered for a given PR number, across assistants
    /// (used by Cleanup on PR-closed).
    pub fn workspaces_for_pr(&self, repo: &RepoCoord, number: u64) -> Vec<Workspace> {
        self.registry
            .read()
            .values()
            .filter(|ws| {
                ws.key.kind == WorkspaceKind::Pr && ws.key.repo == *repo && ws.key.number == number
            })
            .cloned()
            .collect()
    }

    /// For refs of the form `codeagent/{assistant}/...`, returns `assistant`
    /// iff it is in the known set; otherwise `None`.
    pub fn extract_assistant_from_branch(branch: &str) -> Option<Assistant> {
        let rest = branch.strip_prefix("codeagent/")?;
        let assistant = rest.split('/').next()?;
        Assistant::parse(assistant)
    }

    /// Walks every `{base}/{org}/*`, reparsing PR directory names with
    /// `DirectoryNamer` and rebuilding the in-memory registry. Entries whose
    /// names don't parse are ignored with a warning (forward-compat).
    pub async fn recover(&self) -> Result<usize, WorkspaceError> {
        let mut recovered = 0;
        let mut orgs = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(org_entry) = orgs.next_entry().await? {
            if !org_entry.file_type().await?.is_dir() {
                continue;
            }
            let org = org_entry.file_name().to_string_lossy().to_string();
            if org == "_cache" {
                continue;
            }

            let mut children = tokio::fs::read_dir(org_entry.path()).await?;
            while let Some(entry) = children.next_entry().await? {
                if !entry.file_type().await?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                let Ok(parsed) = naming::parse_pr_dir(&name) else {
                    tracing::debug!(name, "unrecognized workspace directory, skipping");
                    continue;
                };
                let Some(assistant) = Assistant::parse(&parsed.assistant) else {
                    tracing::debug!(name, "unknown assistant in workspace directory, skipping");
                    continue;
                };
                // Validated against the pristine clone location, not the
                // `_cache` mirror.
                let repo_path = self.org_dir(&org).join(&parsed.repo);
                if !codeagent_git::is_git_repo(&repo_path) {
                    tracing::debug!(name, "no matching repo directory, skipping");
                    continue;
                }

                let path = entry.path();
                let branch = codeagent_git::current_branch(&path).await.unwrap_or_default();
                let repo = RepoCoord::new(org.clone(), parsed.repo.clone());
                let ws = Workspace {
                    key: WorkspaceKey::pr(assistant, repo, parsed.number),
                    path,
                    branch,
                    session_path: None,
                    remote_url: String::new(),
                    created_at: parsed.timestamp,
                };
                self.register_workspace(ws);
                recovered += 1;
            }
        }

        Ok(recovered)
    }
}

fn container_names(ws: &Workspace) -> Vec<String> {
    let kind = match ws.key.kind {
        WorkspaceKind::Pr => "pr",
        WorkspaceKind::Issue => "issue",
    };
    vec![format!(
        "{}__{}__{}__{}__{}",
        ws.key.assistant.as_str(),
        ws.key.repo.org,
        ws.key.repo.repo,
        kind,
        ws.key.number
    )]
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
