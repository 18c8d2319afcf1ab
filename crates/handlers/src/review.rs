// SPDX-License-Identifier: Apache-2.0

//! The review handler — lowest-priority fallback for `pull_request_review`
//! submissions the tag handler declines because they carry no recognized
//! slash command. Batches every line comment on the review into one
//! prompt, same as the tag
//! handler's review flow, but under a default "review this" framing rather
//! than an explicit `/fix`/`/continue`.

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

pub struct ReviewHandler<Sp: SessionSpawner> {
    platform: Arc<dyn PlatformClient>,
    workspaces: Arc<WorkspaceManager>,
    sessions: Arc<SessionManager<Sp>>,
    config: HandlerConfig,
}

impl<Sp: SessionSpawner> ReviewHandler<Sp> {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        workspaces: Arc<WorkspaceManager>,
        sessions: Arc<SessionManager<Sp>>,
        config: HandlerConfig,
    ) -> Self {
        Self { platform, workspaces, sessions, config }
    }

    async fn run(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let review_ref = ctx.comment.as_ref().ok_or(HandlerError::MissingCommand)?;
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

        let comments = self.platform.list_comments_for_review(&ctx.repo, number, review_ref.id).await?;
        let for_prompt: Vec<(String, Option<u64>, String)> =
            comments.iter().map(|c| (c.path.clone(), c.line, c.body.clone())).collect();
        let prompt_text = prompt::review_batch_prompt(&review_ref.body, &for_prompt);

        let raw_output = self
            .sessions
            .prompt_with_retry(&ws, &prompt_text, self.config.max_prompt_attempts, task.cancellation())
            .await?;

        let changed = codeagent_git::commit_all(&ws.path, &format!("codeagent: address review on PR #{number}")).await?;
        if changed {
            let _ = codeagent_git::push(&ws.path, &ws.branch).await;
        }

        let body = format!("@{} {} comments addressed.\n\n{raw_output}", ctx.actor.login, comments.len());
        self.platform.create_issue_comment(&ctx.repo, number, &body).await?;
        Ok(())
    }
}

#[async_trait]
impl<Sp: SessionSpawner + 'static> ModeHandler for ReviewHandler<Sp> {
    fn name(&self) -> &str {
        "review"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn accepts(&self, ctx: &RouterContext) -> bool {
        ctx.command.is_none()
            && matches!(ctx.event_class, EventClass::PullRequestReview | EventClass::PullRequestReviewComment)
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
#[path = "review_tests.rs"]
mod tests;
