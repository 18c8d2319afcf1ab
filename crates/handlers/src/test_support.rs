// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures: a fake assistant spawner (so handler tests never
//! shell out to a real assistant CLI) and a real local git "remote" (so the
//! git-touching parts of a flow exercise the genuine `codeagent-git`
//! subprocess wrappers, the same way `codeagent-workspace`'s own tests do).

use async_trait::async_trait;
use codeagent_session::{SessionError, SessionProcess, SessionSpawner};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::process::Command;

pub struct FakeProcess {
    pub response: String,
}

#[async_trait]
impl SessionProcess for FakeProcess {
    async fn write_prompt(&mut self, _text: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn read_response(&mut self) -> Result<String, SessionError> {
        Ok(self.response.clone())
    }

    async fn close(&mut self, _timeout: std::time::Duration) {}
}

/// Spawns a [`FakeProcess`] that always answers with the same canned
/// response, counting spawns so tests can assert session reuse.
pub struct FakeSpawner {
    pub response: String,
    pub spawn_count: Arc<AtomicUsize>,
}

impl FakeSpawner {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), spawn_count: Arc::new(AtomicUsize::new(0)) }
    }
}

#[async_trait]
impl SessionSpawner for FakeSpawner {
    async fn spawn(
        &self,
        _assistant: &str,
        _workdir: &Path,
        _session_dir: &Path,
    ) -> Result<Box<dyn SessionProcess>, SessionError> {
        self.spawn_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeProcess { response: self.response.clone() }))
    }
}

/// Initializes a real, non-bare git repo at `dir` with one commit on `main`,
/// suitable for use as a clone source in tests.
pub async fn init_origin(dir: &Path) {
    let mut cmd = Command::new("git");
    cmd.arg("init").arg("-b").arg("main").arg(dir);
    assert!(cmd.output().await.expect("git init runs").status.success());

    for (key, value) in [("user.email", "bot@example.com"), ("user.name", "codeagent-bot")] {
        let mut cfg = Command::new("git");
        cfg.arg("-C").arg(dir).args(["config", key, value]);
        cfg.output().await.expect("git config runs");
    }

    tokio::fs::write(dir.join("README.md"), "hello\n").await.expect("write seed file");
    codeagent_git::commit_all(dir, "initial commit").await.expect("seed commit succeeds");
}

/// A tempdir laid out as `{remote_root}/{org}/{repo}` (a real git origin) and
/// a separate `{workspace_base}` directory the manager under test writes
/// into. `remote_root`'s path is exactly the value `HandlerConfig::remote_base`
/// should be set to, so `util::remote_url(base, repo)` resolves straight to it.
pub struct Fixture {
    pub remote_root: TempDir,
    pub workspace_base: TempDir,
}

impl Fixture {
    pub async fn new(org: &str, repo: &str) -> Self {
        let remote_root = TempDir::new().expect("tempdir");
        let origin_path = remote_root.path().join(org).join(repo);
        tokio::fs::create_dir_all(&origin_path).await.expect("mkdir origin path");
        init_origin(&origin_path).await;
        let workspace_base = TempDir::new().expect("tempdir");
        Self { remote_root, workspace_base }
    }

    pub fn remote_base(&self) -> String {
        self.remote_root.path().display().to_string()
    }
}
