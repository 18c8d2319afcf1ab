// SPDX-License-Identifier: Apache-2.0

//! Timeout wrapper around `tokio::process::Command`, shared by every GitOps
//! invocation so a hung `git` subprocess can never block a handler forever.

use std::time::Duration;
use tokio::process::Command;

/// Default ceiling for any single git worktree/branch subprocess call.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(60);
/// Clone and fetch touch the network and may legitimately run longer.
pub const GIT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, thiserror::Error)]
pub enum SubprocessError {
    #[error("{0} timed out after {1:?}")]
    TimedOut(String, Duration),
    #[error("{0} failed to spawn: {1}")]
    SpawnFailed(String, std::io::Error),
}

/// Run `cmd` to completion, killing it if it exceeds `timeout`.
///
/// `label` is used only for error messages and tracing.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<std::process::Output, SubprocessError> {
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let child = cmd.spawn().map_err(|e| SubprocessError::SpawnFailed(label.to_string(), e))?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            tracing::debug!(label, status = %output.status, "subprocess completed");
            Ok(output)
        }
        Ok(Err(e)) => Err(SubprocessError::SpawnFailed(label.to_string(), e)),
        Err(_) => {
            tracing::warn!(label, ?timeout, "subprocess timed out");
            Err(SubprocessError::TimedOut(label.to_string(), timeout))
        }
    }
}
