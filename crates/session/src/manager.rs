// SPDX-License-Identifier: Apache-2.0

//! `SessionManager` — owns the lifecycle of per-Workspace assistant
//! subprocesses, including prompt delivery with retry.

use crate::error::SessionError;
use crate::process::{SessionProcess, SessionSpawner};
use codeagent_core::{indicates_dead_process, SessionStatus, Workspace, WorkspaceKey};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

struct Session {
    process: Box<dyn SessionProcess>,
    status: SessionStatus,
}

/// Owns a `workspace-key -> Session` mapping and brokers `prompt` calls
/// against whichever process is currently live for that workspace.
pub struct SessionManager<Sp: SessionSpawner> {
    spawner: Sp,
    sessions: AsyncMutex<HashMap<WorkspaceKey, Arc<AsyncMutex<Session>>>>,
}

impl<Sp: SessionSpawner> SessionManager<Sp> {
    pub fn new(spawner: Sp) -> Self {
        Self { spawner, sessions: AsyncMutex::new(HashMap::new()) }
    }

    /// Returns the live session for `ws`, spawning a fresh subprocess if
    /// none exists or the previous one is dead.
    async fn get_session(&self, ws: &Workspace) -> Result<Arc<AsyncMutex<Session>>, SessionError> {
        let mut sessions = self.sessions.lock().await;

        if let Some(existing) = sessions.get(&ws.key) {
            let is_dead = existing.lock().await.status == SessionStatus::Dead;
            if !is_dead {
                return Ok(existing.clone());
            }
        }

        let session_dir = ws.session_path.clone().unwrap_or_else(|| ws.path.join(".codeagent-session"));
        let process = self.spawner.spawn(ws.key.assistant.as_str(), &ws.path, &session_dir).await?;
        let session = Arc::new(AsyncMutex::new(Session { process, status: SessionStatus::Alive }));
        sessions.insert(ws.key.clone(), session.clone());
        Ok(session)
    }

    /// Writes `prompt` to the session's stdin and reads its full response.
    /// On `broken pipe`/`process has already exited`, marks the session
    /// dead so the next call recreates it; other errors are returned as-is.
    pub async fn prompt(&self, ws: &Workspace, prompt: &str) -> Result<String, SessionError> {
        let session = self.get_session(ws).await?;
        let mut guard = session.lock().await;
        let result = async {
            guard.process.write_prompt(prompt).await?;
            guard.process.read_response().await
        }
        .await;

        if let Err(e) = &result {
            if indicates_dead_process(&e.to_string()) {
                guard.status = SessionStatus::Dead;
            }
        }
        result
    }

    /// Retries `prompt` up to `max_attempts` times with backoff
    /// `attempt * 500ms`. Errors indicating a dead process trigger session
    /// recreation (via `get_session`) before the next attempt; all other
    /// errors retry the existing session. On exhaustion, the last error is
    /// wrapped with the attempt count. `cancel` is checked before every
    /// attempt (and before each backoff sleep), so a caller cancelling the
    /// surrounding task stops the retry loop without waiting out the delay.
    pub async fn prompt_with_retry(
        &self,
        ws: &Workspace,
        prompt: &str,
        max_attempts: usize,
        cancel: &CancellationToken,
    ) -> Result<String, SessionError> {
        let mut last_err = None;
        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            if attempt > 1 {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(500 * attempt as u64)) => {}
                    _ = cancel.cancelled() => return Err(SessionError::Cancelled),
                }
            }
            match self.prompt(ws, prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => SessionError::RetriesExhausted { attempts: max_attempts, source: Box::new(e) },
            None => SessionError::RetriesExhausted {
                attempts: max_attempts,
                source: Box::new(SessionError::NoAttemptsMade),
            },
        })
    }

    /// Closes the session's stdin, waits for exit with a bounded timeout,
    /// then escalates to kill.
    pub async fn close_session(&self, ws: &Workspace) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.remove(&ws.key) {
            session.lock().await.process.close(Duration::from_secs(10)).await;
        }
    }

    /// Number of currently-live sessions, for the `/healthz` surface.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
