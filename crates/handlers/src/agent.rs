// SPDX-License-Identifier: Apache-2.0

//! The agent handler — runs automatically on `pull_request` opened/synchronize
//! events, independent of any slash command. Its contract with the core
//! mirrors the PR-comment flow; only the prompt template differs.

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::prompt;
use crate::util::remote_url;
use async_trait::async_trait;
use codeagent_core::{EventClass, RouterContext, TaskContext, WorkspaceKey};
use codeagent_platform::PlatformClient;
use codeagent_router::ModeHandler;
use codeagent_session::{SessionManager, SessionSpawner};
use codeagent_workspace::{PrRef, WorkspaceManager};
use std::sync::Arc;

pub struct AgentHandler<Sp: SessionSpawner> {
    platform: Arc<dyn PlatformClient>,
    workspaces: Arc<WorkspaceManager>,
    sessions: Arc<SessionManager<Sp>>,
    config: HandlerConfig,
}

impl<Sp: SessionSpawner> AgentHandler<Sp> {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        workspaces: Arc<WorkspaceManager>,
        sessions: Arc<SessionManager<Sp>>,
        config: HandlerConfig,
    ) -> Self {
        Self { platform, workspaces, sessions, config }
    }

    async fn run(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let pr = self.platform.get_pr(&ctx.repo, number).await?;
        let assistant = WorkspaceManager::<codeagent_core::SystemClock>::extract_assistant_from_branch(&pr.head_ref)
            .unwrap_or(self.config.default_assistant);
        let _task_guard = self.workspaces.lock_task(WorkspaceKey::pr(assistant, ctx.repo.clone(), number)).await;

        let pr_ref = PrRef {
            org: ctx.repo.org.clone(),
            repo: ctx.repo.repo.clone(),
            number,
            head_ref: pr.head_ref.clone(),
            remote_url: remote_url(&self.config.remote_base, &ctx.repo),
        };
        let ws = self.workspaces.get_or_create_for_pr(&pr_ref, assistant).await?;
        if let Err(e) = codeagent_git::pull_rebase(&ws.path).await {
            tracing::warn!(pr = number, error = %e, "pull --rebase failed before agent prompt, continuing");
        }

        let prompt_text = prompt::agent_prompt(&pr.title, &pr.body);
        let raw_output = self
            .sessions
            .prompt_with_retry(&ws, &prompt_text, self.config.max_prompt_attempts, task.cancellation())
            .await?;

        let changed = codeagent_git::commit_all(&ws.path, "codeagent: automated continuation").await?;
        if changed {
            if let Err(e) = codeagent_git::push(&ws.path, &ws.branch).await {
                tracing::warn!(pr = number, error = %e, "agent handler push failed, continuing");
            }
        }

        self.platform.create_issue_comment(&ctx.repo, number, &raw_output).await?;
        Ok(())
    }
}

#[async_trait]
impl<Sp: SessionSpawner + 'static> ModeHandler for AgentHandler<Sp> {
    fn name(&self) -> &str {
        "agent"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn accepts(&self, ctx: &RouterContext) -> bool {
        matches!(ctx.event_class, EventClass::PullRequestOpened | EventClass::PullRequestSynchronized)
    }

    async fn execute(
        &self,
        ctx: &RouterContext,
        task: &TaskContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.run(ctx, ctx.reference.number(), task)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
