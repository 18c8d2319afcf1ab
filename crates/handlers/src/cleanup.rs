// SPDX-License-Identifier: Apache-2.0

//! The cleanup orchestrator — a periodic sweep of expired workspaces plus
//! immediate reclamation on `pull_request.closed`.
//!
//! Registered as a `ModeHandler` for `PullRequestClosed` only, so the router
//! can dispatch PR-closed events through the same `{accepts, execute,
//! priority, name}` seam as every other handler; the periodic sweep runs
//! independently via
//! [`CleanupOrchestrator::spawn_loop`].

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use async_trait::async_trait;
use codeagent_core::{EventClass, RouterContext, TaskContext};
use codeagent_platform::PlatformClient;
use codeagent_router::ModeHandler;
use codeagent_session::{SessionManager, SessionSpawner};
use codeagent_workspace::WorkspaceManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const SWEEP_PERIOD: Duration = Duration::from_secs(3600);

pub struct CleanupOrchestrator<Sp: SessionSpawner> {
    workspaces: Arc<WorkspaceManager>,
    sessions: Arc<SessionManager<Sp>>,
    platform: Arc<dyn PlatformClient>,
    config: HandlerConfig,
}

impl<Sp: SessionSpawner + 'static> CleanupOrchestrator<Sp> {
    pub fn new(
        workspaces: Arc<WorkspaceManager>,
        sessions: Arc<SessionManager<Sp>>,
        platform: Arc<dyn PlatformClient>,
        config: HandlerConfig,
    ) -> Self {
        Self { workspaces, sessions, platform, config }
    }

    /// One tick: closes the session, removes the worktree and session
    /// directory, and evicts any matching container for every workspace
    /// older than `cleanup_after`. Returns the number successfully reclaimed.
    pub async fn sweep(&self) -> usize {
        let expired = self.workspaces.get_expired(self.config.cleanup_after);
        let mut cleaned = 0;
        for ws in expired {
            let _task_guard = self.workspaces.lock_task(ws.key.clone()).await;
            self.sessions.close_session(&ws).await;
            if self.workspaces.cleanup_workspace(&ws).await {
                cleaned += 1;
            } else {
                tracing::warn!(key = %ws.key, "cleanup sweep left a partial workspace behind");
            }
        }
        cleaned
    }

    /// Spawns the 1h periodic sweep as a background task.
    pub fn spawn_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_PERIOD);
            loop {
                interval.tick().await;
                let cleaned = self.sweep().await;
                tracing::info!(cleaned, "cleanup sweep complete");
            }
        })
    }

    async fn handle_pr_closed(&self, ctx: &RouterContext, number: u64) -> Result<(), HandlerError> {
        let pr = self.platform.get_pr(&ctx.repo, number).await?;
        for ws in self.workspaces.workspaces_for_pr(&ctx.repo, number) {
            let _task_guard = self.workspaces.lock_task(ws.key.clone()).await;
            self.sessions.close_session(&ws).await;
            self.workspaces.cleanup_workspace(&ws).await;
        }
        if pr.head_ref.starts_with("codeagent") {
            if let Err(e) = self.platform.delete_branch(&ctx.repo, &pr.head_ref).await {
                tracing::warn!(pr = number, error = %e, "failed to delete branch on PR close");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<Sp: SessionSpawner + 'static> ModeHandler for CleanupOrchestrator<Sp> {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn accepts(&self, ctx: &RouterContext) -> bool {
        matches!(ctx.event_class, EventClass::PullRequestClosed)
    }

    async fn execute(
        &self,
        ctx: &RouterContext,
        _task: &TaskContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.handle_pr_closed(ctx, ctx.reference.number())
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
