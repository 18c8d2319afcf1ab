// SPDX-License-Identifier: Apache-2.0

use super::*;
use codeagent_core::WorkspaceKind;
use tempfile::TempDir;
use tokio::process::Command;

async fn init_origin(dir: &Path) {
    let mut cmd = Command::new("git");
    cmd.arg("init").arg("-b").arg("main").arg(dir);
    assert!(cmd.output().await.unwrap().status.success());
    for (key, value) in [("user.email", "bot@example.com"), ("user.name", "codeagent-bot")] {
        let mut cfg = Command::new("git");
        cfg.arg("-C").arg(dir).args(["config", key, value]);
        cfg.output().await.unwrap();
    }
    tokio::fs::write(dir.join("README.md"), "hello\n").await.unwrap();
    codeagent_git::commit_all(dir, "initial commit").await.unwrap();
}

fn manager(base: &Path) -> WorkspaceManager {
    WorkspaceManager::new(base, RepoCache::new(base))
}

#[tokio::test]
async fn create_from_pr_checks_out_head_ref() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(origin.path()).args(["checkout", "-b", "feature/x"]);
    cmd.output().await.unwrap();

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let pr = PrRef {
        org: "acme".into(),
        repo: "widget".into(),
        number: 101,
        head_ref: "feature/x".into(),
        remote_url: origin.path().display().to_string(),
    };

    let ws = mgr.create_from_pr(&pr, Assistant::Claude).await.unwrap();
    assert_eq!(ws.branch, "feature/x");
    assert_eq!(ws.key.kind, WorkspaceKind::Pr);
    assert!(ws.session_path.is_some());
}

#[tokio::test]
async fn identity_uniqueness_second_call_returns_same_workspace() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let pr = PrRef {
        org: "acme".into(),
        repo: "widget".into(),
        number: 101,
        head_ref: "main".into(),
        remote_url: origin.path().display().to_string(),
    };

    let first = mgr.create_from_pr(&pr, Assistant::Claude).await.unwrap();
    let second = mgr.get_or_create_for_pr(&pr, Assistant::Claude).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(mgr.workspaces_for_pr(&pr.repo_coord(), 101).len(), 1);
}

#[tokio::test]
async fn validation_failure_triggers_rebuild() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(origin.path()).args(["checkout", "-b", "other"]);
    cmd.output().await.unwrap();
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(origin.path()).args(["checkout", "main"]);
    cmd.output().await.unwrap();

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let pr = PrRef {
        org: "acme".into(),
        repo: "widget".into(),
        number: 7,
        head_ref: "main".into(),
        remote_url: origin.path().display().to_string(),
    };

    let first = mgr.create_from_pr(&pr, Assistant::Claude).await.unwrap();

    // Mutate HEAD to a branch different from the PR's head ref.
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&first.path).args(["checkout", "other"]);
    assert!(cmd.output().await.unwrap().status.success());

    let rebuilt = mgr.get_or_create_for_pr(&pr, Assistant::Claude).await.unwrap();
    assert_eq!(rebuilt.branch, "main");
    assert_eq!(mgr.workspaces_for_pr(&pr.repo_coord(), 7).len(), 1);
}

#[tokio::test]
async fn move_issue_to_pr_preserves_branch() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let issue = IssueRef {
        url: "https://example.com/acme/widget/issues/42".into(),
        number: 42,
        remote_url: origin.path().display().to_string(),
    };

    let issue_ws = mgr.create_from_issue(&issue, Assistant::Claude).await.unwrap();
    let branch_before = issue_ws.branch.clone();

    let pr_ws = mgr.move_issue_to_pr(&issue_ws, 99).await.unwrap();
    assert_eq!(pr_ws.branch, branch_before);
    assert_eq!(pr_ws.key.kind, WorkspaceKind::Pr);
    assert_eq!(pr_ws.key.number, 99);
    assert!(naming::parse_pr_dir(pr_ws.path.file_name().unwrap().to_str().unwrap()).is_ok());
    assert!(mgr.lookup(&issue_ws.key).is_none());
}

#[tokio::test]
async fn cleanup_workspace_removes_tree_session_and_registration() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let pr = PrRef {
        org: "acme".into(),
        repo: "widget".into(),
        number: 5,
        head_ref: "main".into(),
        remote_url: origin.path().display().to_string(),
    };
    let ws = mgr.create_from_pr(&pr, Assistant::Claude).await.unwrap();
    let session_path = ws.session_path.clone().unwrap();

    assert!(mgr.cleanup_workspace(&ws).await);
    assert!(!ws.path.exists());
    assert!(!session_path.exists());
    assert!(mgr.lookup(&ws.key).is_none());
}

#[yare::parameterized(
    claude = { "codeagent/claude/issue-42-123", Some(Assistant::Claude) },
    gemini = { "codeagent/gemini/issue-1-2", Some(Assistant::Gemini) },
    unknown = { "codeagent/robot/issue-1-2", None },
    not_codeagent = { "feature/x", None },
)]
fn extract_assistant_from_branch_cases(branch: &str, expected: Option<Assistant>) {
    assert_eq!(WorkspaceManager::<codeagent_core::FakeClock>::extract_assistant_from_branch(branch), expected);
}

#[tokio::test]
async fn startup_recovery_finds_pr_directories() {
    let origin = TempDir::new().unwrap();
    init_origin(origin.path()).await;

    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let pr = PrRef {
        org: "acme".into(),
        repo: "widget".into(),
        number: 101,
        head_ref: "main".into(),
        remote_url: origin.path().display().to_string(),
    };
    let ws = mgr.create_from_pr(&pr, Assistant::Claude).await.unwrap();

    // The pristine `{base}/{org}/{repo}` recovery checks is a separate
    // location from the `_cache` mirror.
    init_origin(&base.path().join("acme").join("widget")).await;

    // Fresh manager simulating a restart, same base dir.
    let fresh = manager(base.path());
    let recovered = fresh.recover().await.unwrap();
    assert_eq!(recovered, 1);
    let rebuilt = fresh.lookup(&ws.key).expect("recovered workspace");
    assert_eq!(rebuilt.created_at, ws.created_at);
}

/// Two on-disk PR directories for different assistants under the same org,
/// plus a valid pristine repo, recover as two distinct registered
/// workspaces with correctly parsed timestamps.
#[tokio::test]
async fn startup_recovery_scenario_s6_two_assistants() {
    let base = TempDir::new().unwrap();
    init_origin(&base.path().join("acme").join("widget")).await;

    for (assistant, ts) in [("claude", 1_700_000_000u64), ("gemini", 1_700_000_100u64)] {
        let dir_name = format!("{assistant}__widget__pr__101__{ts}");
        let dir = base.path().join("acme").join(&dir_name);
        init_origin(&dir).await;
    }

    let mgr = manager(base.path());
    let recovered = mgr.recover().await.unwrap();
    assert_eq!(recovered, 2);

    let claude_ws = mgr
        .lookup(&WorkspaceKey::pr(Assistant::Claude, RepoCoord::new("acme", "widget"), 101))
        .expect("claude workspace recovered");
    assert_eq!(claude_ws.created_at, 1_700_000_000);

    let gemini_ws = mgr
        .lookup(&WorkspaceKey::pr(Assistant::Gemini, RepoCoord::new("acme", "widget"), 101))
        .expect("gemini workspace recovered");
    assert_eq!(gemini_ws.created_at, 1_700_000_100);
}

#[tokio::test]
async fn lock_task_serializes_against_the_same_key_not_different_keys() {
    let base = TempDir::new().unwrap();
    let mgr = manager(base.path());
    let key = WorkspaceKey::pr(Assistant::Claude, RepoCoord::new("acme", "widget"), 101);

    let first = mgr.lock_task(key.clone()).await;
    let other_key = WorkspaceKey::pr(Assistant::Claude, RepoCoord::new("acme", "widget"), 202);
    let unrelated = tokio::time::timeout(std::time::Duration::from_millis(50), mgr.lock_task(other_key)).await;
    assert!(unrelated.is_ok(), "a different key's lock is never blocked by this one");

    let same_key_attempt = tokio::time::timeout(std::time::Duration::from_millis(50), mgr.lock_task(key.clone()));
    assert!(same_key_attempt.await.is_err(), "the same key is blocked while `first` is held");

    drop(first);
    let reacquired = tokio::time::timeout(std::time::Duration::from_millis(50), mgr.lock_task(key)).await;
    assert!(reacquired.is_ok(), "released after the guard drops");
}
