// SPDX-License-Identifier: Apache-2.0

//! Thin, synchronous-contract wrappers for `clone`, `worktree add/move/remove`,
//! and branch operations.
//!
//! "Synchronous" here means each call runs a git subprocess to completion and
//! returns — there is no background job — even though the implementation is
//! `async fn` so it composes with the rest of the pipeline's tokio runtime.

use crate::error::GitError;
use crate::subprocess::{run_with_timeout, GIT_NETWORK_TIMEOUT, GIT_TIMEOUT};
use std::path::Path;
use tokio::process::Command;

fn git(repo_path: impl AsRef<Path>) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_path.as_ref());
    // Worktree/branch ops must never pick up an ambient GIT_DIR/GIT_WORK_TREE
    // from the caller's environment.
    cmd.env_remove("GIT_DIR");
    cmd.env_remove("GIT_WORK_TREE");
    cmd
}

fn check_status(label: &str, output: std::process::Output) -> Result<std::process::Output, GitError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::CommandFailed {
            status: output.status.code().unwrap_or(-1),
            stderr: format!("{label}: {}", String::from_utf8_lossy(&output.stderr).trim()),
        })
    }
}

/// Clone `url` into `path`, optionally checking out or creating `branch`.
pub async fn clone(
    url: &str,
    path: &Path,
    branch: Option<&str>,
    create_branch: bool,
) -> Result<(), GitError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone");
    if let Some(branch) = branch {
        if create_branch {
            // A new branch can't be cloned directly; clone default then branch.
        } else {
            cmd.arg("--branch").arg(branch);
        }
    }
    cmd.arg(url).arg(path);

    let output = run_with_timeout(cmd, GIT_NETWORK_TIMEOUT, "git clone").await?;
    check_status("git clone", output)?;

    if let (Some(branch), true) = (branch, create_branch) {
        create_local_branch(path, branch).await?;
    }

    configure_safe_directory(path).await;
    configure_pull_rebase(path).await;
    Ok(())
}

async fn create_local_branch(path: &Path, branch: &str) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["checkout", "-b", branch]);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git checkout -b").await?;
    check_status("git checkout -b", output).map(|_| ())
}

/// Add a new working tree at `out_path`, on `branch`.
///
/// When `create_new` is set, `branch` is created at `HEAD`; otherwise the
/// branch (typically a PR's head ref fetched from origin) must already exist.
pub async fn worktree_add(
    repo_path: &Path,
    out_path: &Path,
    branch: &str,
    create_new: bool,
) -> Result<(), GitError> {
    if out_path.exists() {
        return Err(GitError::CommandFailed {
            status: -1,
            stderr: format!("worktree path already exists: {}", out_path.display()),
        });
    }
    if let Some(parent) = out_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut cmd = git(repo_path);
    cmd.arg("worktree").arg("add");
    if create_new {
        cmd.arg("-b").arg(branch).arg(out_path);
    } else {
        cmd.arg(out_path).arg(branch);
    }

    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git worktree add").await?;
    check_status("git worktree add", output).map(|_| ())
}

/// Relocate an existing working tree, updating git's worktree metadata.
pub async fn worktree_move(
    repo_path: &Path,
    old_path: &Path,
    new_path: &Path,
) -> Result<(), GitError> {
    if new_path.exists() {
        return Err(GitError::CommandFailed {
            status: -1,
            stderr: format!("worktree move destination already exists: {}", new_path.display()),
        });
    }
    if let Some(parent) = new_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut cmd = git(repo_path);
    cmd.arg("worktree").arg("move").arg(old_path).arg(new_path);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git worktree move").await?;
    check_status("git worktree move", output).map(|_| ())
}

/// Remove a working tree and prune it from git's worktree metadata.
pub async fn worktree_remove(repo_path: &Path, path: &Path) -> Result<(), GitError> {
    let mut cmd = git(repo_path);
    cmd.arg("worktree").arg("remove").arg("--force").arg(path);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git worktree remove").await?;
    check_status("git worktree remove", output)?;

    let mut prune = git(repo_path);
    prune.arg("worktree").arg("prune");
    let _ = run_with_timeout(prune, GIT_TIMEOUT, "git worktree prune").await;
    Ok(())
}

/// The branch `path`'s `HEAD` currently points at, or an error if detached.
pub async fn current_branch(path: &Path) -> Result<String, GitError> {
    let mut cmd = git(path);
    cmd.args(["symbolic-ref", "--short", "HEAD"]);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git symbolic-ref").await?;
    let output = check_status("git symbolic-ref", output)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// The commit sha `rev` resolves to in the repo at `path`.
pub async fn rev_parse(path: &Path, rev: &str) -> Result<String, GitError> {
    let mut cmd = git(path);
    cmd.args(["rev-parse", rev]);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git rev-parse").await?;
    let output = check_status("git rev-parse", output)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// The commit sha `HEAD` currently points at (works whether or not detached).
pub async fn current_commit(path: &Path) -> Result<String, GitError> {
    rev_parse(path, "HEAD").await
}

/// Whether `HEAD` is detached (not on any local branch).
pub async fn is_detached(path: &Path) -> bool {
    current_branch(path).await.is_err()
}

/// Point `origin` at `url`.
pub async fn set_remote_url(path: &Path, url: &str) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["remote", "set-url", "origin", url]);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git remote set-url").await?;
    check_status("git remote set-url", output).map(|_| ())
}

/// Fetch all remotes and prune stale remote-tracking branches.
pub async fn fetch_all_prune(path: &Path) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["fetch", "--all", "--prune"]);
    let output = run_with_timeout(cmd, GIT_NETWORK_TIMEOUT, "git fetch --all --prune").await?;
    check_status("git fetch --all --prune", output).map(|_| ())
}

/// Rebase the current branch on its upstream.
pub async fn rebase_current(path: &Path) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.arg("rebase");
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git rebase").await?;
    check_status("git rebase", output).map(|_| ())
}

/// Pull the latest commits for the checked-out branch (`fetch` + `rebase`,
/// used by PR flows that want the workspace brought up to date before
/// prompting the assistant).
pub async fn pull_rebase(path: &Path) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["pull", "--rebase"]);
    let output = run_with_timeout(cmd, GIT_NETWORK_TIMEOUT, "git pull --rebase").await?;
    check_status("git pull --rebase", output).map(|_| ())
}

/// Delete a local branch.
pub async fn delete_branch(path: &Path, branch: &str) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["branch", "-D", branch]);
    let output = run_with_timeout(cmd, GIT_TIMEOUT, "git branch -D").await?;
    check_status("git branch -D", output).map(|_| ())
}

/// `git add -A && git commit -m <message>`. Returns `Ok(false)` (not an
/// error) when there was nothing to commit.
pub async fn commit_all(path: &Path, message: &str) -> Result<bool, GitError> {
    let mut add = git(path);
    add.args(["add", "-A"]);
    let output = run_with_timeout(add, GIT_TIMEOUT, "git add -A").await?;
    check_status("git add -A", output)?;

    let mut status = git(path);
    status.args(["status", "--porcelain"]);
    let output = run_with_timeout(status, GIT_TIMEOUT, "git status --porcelain").await?;
    let output = check_status("git status --porcelain", output)?;
    if output.stdout.is_empty() {
        return Ok(false);
    }

    let mut commit = git(path);
    commit.args(["commit", "-m", message]);
    let output = run_with_timeout(commit, GIT_TIMEOUT, "git commit").await?;
    check_status("git commit", output)?;
    Ok(true)
}

/// Push the current branch to `origin`, creating the upstream if needed.
pub async fn push(path: &Path, branch: &str) -> Result<(), GitError> {
    let mut cmd = git(path);
    cmd.args(["push", "--set-upstream", "origin", branch]);
    let output = run_with_timeout(cmd, GIT_NETWORK_TIMEOUT, "git push").await?;
    check_status("git push", output).map(|_| ())
}

/// Idempotently mark `path` as a `safe.directory` for the current user.
///
/// Failures here are logged but non-fatal.
pub async fn configure_safe_directory(path: &Path) {
    let mut cmd = git(path);
    cmd.args(["config", "--local", "safe.directory", &path.display().to_string()]);
    if let Err(e) = run_with_timeout(cmd, GIT_TIMEOUT, "git config safe.directory").await {
        tracing::warn!(path = %path.display(), error = %e, "failed to configure safe.directory");
    }
}

/// Idempotently set `pull.rebase = true` locally. Non-fatal on failure.
pub async fn configure_pull_rebase(path: &Path) {
    let mut cmd = git(path);
    cmd.args(["config", "--local", "pull.rebase", "true"]);
    if let Err(e) = run_with_timeout(cmd, GIT_TIMEOUT, "git config pull.rebase").await {
        tracing::warn!(path = %path.display(), error = %e, "failed to configure pull.rebase");
    }
}

/// Whether `path` contains a valid `.git`.
pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
