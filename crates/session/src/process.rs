// SPDX-License-Identifier: Apache-2.0

//! The subprocess I/O contract a `Session` drives: write a prompt to stdin,
//! read until the assistant's response stream ends.
//!
//! The external assistant CLI's wire format is out of scope here; this
//! module only fixes the shape every implementation must honor so
//! `SessionManager`'s retry/recreation policy can be tested against a fake.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};

use crate::error::SessionError;

/// A single prompt/response round-trip against a live assistant subprocess.
#[async_trait]
pub trait SessionProcess: Send + Sync {
    async fn write_prompt(&mut self, text: &str) -> Result<(), SessionError>;
    async fn read_response(&mut self) -> Result<String, SessionError>;
    /// Closes stdin, waits for exit with a bounded timeout, then escalates
    /// to kill.
    async fn close(&mut self, timeout: std::time::Duration);
}

/// Spawns the subprocess bound to one Workspace.
#[async_trait]
pub trait SessionSpawner: Send + Sync {
    async fn spawn(
        &self,
        assistant: &str,
        workdir: &std::path::Path,
        session_dir: &std::path::Path,
    ) -> Result<Box<dyn SessionProcess>, SessionError>;
}

/// The sentinel line each end of a response is terminated with. The real
/// assistant CLI's prompt protocol is out of scope here; this process model
/// assumes whatever wraps the CLI emits this marker once its turn is
/// complete.
pub const TURN_END_MARKER: &str = "\u{0}CODEAGENT_TURN_END\u{0}";

/// Drives a real child process over piped stdin/stdout.
pub struct ChildSessionProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ChildSessionProcess {
    pub fn workdir_command(command: &str, workdir: &std::path::Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("bash");
        cmd.arg("-c")
            .arg(command)
            .current_dir(workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl SessionProcess for ChildSessionProcess {
    async fn write_prompt(&mut self, text: &str) -> Result<(), SessionError> {
        self.stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| SessionError::WriteFailed(e.to_string()))?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| SessionError::WriteFailed(e.to_string()))?;
        self.stdin.flush().await.map_err(|e| SessionError::WriteFailed(e.to_string()))
    }

    async fn read_response(&mut self) -> Result<String, SessionError> {
        let mut buf = String::new();
        loop {
            let mut line = String::new();
            let n = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| SessionError::ReadFailed(e.to_string()))?;
            if n == 0 {
                return Err(SessionError::ReadFailed("process has already exited".into()));
            }
            if line.trim_end() == TURN_END_MARKER {
                break;
            }
            buf.push_str(&line);
        }
        Ok(buf)
    }

    async fn close(&mut self, timeout: std::time::Duration) {
        drop(self.stdin.shutdown().await);
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "error waiting for subprocess exit"),
            Err(_) => {
                tracing::warn!("subprocess did not exit in time, killing");
                let _ = self.child.kill().await;
            }
        }
    }
}

/// Spawns the configured assistant CLI as a long-lived child, wrapping each
/// invocation in a reaper task so exited processes don't zombie.
pub struct CommandSpawner {
    pub command_for: fn(assistant: &str) -> String,
}

impl CommandSpawner {
    pub fn new(command_for: fn(assistant: &str) -> String) -> Self {
        Self { command_for }
    }
}

#[async_trait]
impl SessionSpawner for CommandSpawner {
    async fn spawn(
        &self,
        assistant: &str,
        workdir: &std::path::Path,
        session_dir: &std::path::Path,
    ) -> Result<Box<dyn SessionProcess>, SessionError> {
        if !workdir.exists() {
            return Err(SessionError::SpawnFailed(format!(
                "working directory does not exist: {}",
                workdir.display()
            )));
        }
        tokio::fs::create_dir_all(session_dir)
            .await
            .map_err(|e| SessionError::SpawnFailed(e.to_string()))?;

        let command = (self.command_for)(assistant);
        let mut cmd = ChildSessionProcess::workdir_command(&command, workdir);
        cmd.env("CODEAGENT_SESSION_DIR", session_dir_str(session_dir));

        let mut child =
            cmd.spawn().map_err(|e| SessionError::SpawnFailed(format!("failed to spawn: {e}")))?;
        let stdin = child.stdin.take().ok_or_else(|| {
            SessionError::SpawnFailed("child process has no stdin handle".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            SessionError::SpawnFailed("child process has no stdout handle".into())
        })?;

        tracing::info!(assistant, workdir = %workdir.display(), "assistant subprocess spawned");
        Ok(Box::new(ChildSessionProcess { child, stdin, stdout: BufReader::new(stdout) }))
    }
}

fn session_dir_str(p: &std::path::Path) -> PathBuf {
    p.to_path_buf()
}
