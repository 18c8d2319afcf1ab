// SPDX-License-Identifier: Apache-2.0

use super::*;
use codeagent_core::{Assistant, RepoCoord, Workspace, WorkspaceKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct FlakyProcess {
    write_calls: Arc<AtomicUsize>,
    fail_until: usize,
}

#[async_trait::async_trait]
impl SessionProcess for FlakyProcess {
    async fn write_prompt(&mut self, _text: &str) -> Result<(), SessionError> {
        let call = self.write_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_until {
            return Err(SessionError::WriteFailed("broken pipe".into()));
        }
        Ok(())
    }

    async fn read_response(&mut self) -> Result<String, SessionError> {
        Ok("ok".into())
    }

    async fn close(&mut self, _timeout: std::time::Duration) {}
}

struct FlakySpawner {
    write_calls: Arc<AtomicUsize>,
    fail_until: usize,
    spawn_count: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl SessionSpawner for FlakySpawner {
    async fn spawn(
        &self,
        _assistant: &str,
        _workdir: &std::path::Path,
        _session_dir: &std::path::Path,
    ) -> Result<Box<dyn SessionProcess>, SessionError> {
        self.spawn_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FlakyProcess { write_calls: self.write_calls.clone(), fail_until: self.fail_until }))
    }
}

fn fixture_workspace() -> Workspace {
    Workspace {
        key: WorkspaceKey::pr(Assistant::Claude, RepoCoord::new("acme", "widget"), 101),
        path: std::path::PathBuf::from("/tmp/does-not-need-to-exist"),
        branch: "feature/x".into(),
        session_path: None,
        remote_url: "https://example.com/acme/widget.git".into(),
        created_at: 0,
    }
}

#[tokio::test]
async fn retry_recreates_session_on_broken_pipe_then_succeeds() {
    let write_calls = Arc::new(AtomicUsize::new(0));
    let spawn_count = Arc::new(AtomicUsize::new(0));
    let spawner =
        FlakySpawner { write_calls: write_calls.clone(), fail_until: 2, spawn_count: spawn_count.clone() };
    let manager = SessionManager::new(spawner);
    let ws = fixture_workspace();

    let result = manager.prompt_with_retry(&ws, "do the thing", 3, &CancellationToken::new()).await;
    assert_eq!(result.unwrap(), "ok");
    assert_eq!(spawn_count.load(Ordering::SeqCst), 3, "initial spawn + 2 recreations");
}

#[tokio::test]
async fn retry_exhaustion_wraps_error_with_attempt_count() {
    let write_calls = Arc::new(AtomicUsize::new(0));
    let spawn_count = Arc::new(AtomicUsize::new(0));
    let spawner =
        FlakySpawner { write_calls: write_calls.clone(), fail_until: 2, spawn_count: spawn_count.clone() };
    let manager = SessionManager::new(spawner);
    let ws = fixture_workspace();

    let err = manager.prompt_with_retry(&ws, "do the thing", 2, &CancellationToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("2 attempts"), "got: {err}");
}

#[tokio::test]
async fn non_broken_pipe_errors_retry_without_recreating() {
    struct AlwaysReadFails;
    #[async_trait::async_trait]
    impl SessionProcess for AlwaysReadFails {
        async fn write_prompt(&mut self, _text: &str) -> Result<(), SessionError> {
            Ok(())
        }
        async fn read_response(&mut self) -> Result<String, SessionError> {
            Err(SessionError::ReadFailed("malformed output".into()))
        }
        async fn close(&mut self, _timeout: std::time::Duration) {}
    }
    struct SingleSpawner(Arc<AtomicUsize>);
    #[async_trait::async_trait]
    impl SessionSpawner for SingleSpawner {
        async fn spawn(
            &self,
            _assistant: &str,
            _workdir: &std::path::Path,
            _session_dir: &std::path::Path,
        ) -> Result<Box<dyn SessionProcess>, SessionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(AlwaysReadFails))
        }
    }

    let spawn_count = Arc::new(AtomicUsize::new(0));
    let manager = SessionManager::new(SingleSpawner(spawn_count.clone()));
    let ws = fixture_workspace();

    let err = manager.prompt_with_retry(&ws, "do the thing", 3, &CancellationToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("3 attempts"));
    assert_eq!(spawn_count.load(Ordering::SeqCst), 1, "no recreation for non-subprocess-death errors");
}

#[tokio::test]
async fn cancellation_is_observed_before_the_next_attempt() {
    let write_calls = Arc::new(AtomicUsize::new(0));
    let spawn_count = Arc::new(AtomicUsize::new(0));
    let spawner = FlakySpawner { write_calls, fail_until: 100, spawn_count: spawn_count.clone() };
    let manager = SessionManager::new(spawner);
    let ws = fixture_workspace();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = manager.prompt_with_retry(&ws, "do the thing", 3, &cancel).await.unwrap_err();
    assert!(matches!(err, SessionError::Cancelled));
    assert_eq!(spawn_count.load(Ordering::SeqCst), 0, "cancelled before the first attempt ever spawns");
}
