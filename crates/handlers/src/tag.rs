// SPDX-License-Identifier: Apache-2.0

//! The tag handler — highest-priority `ModeHandler`, triggered by a
//! recognized slash command. Covers the issue-comment "new PR", PR-comment
//! `/continue`/`/fix`, and review/review-comment flows.

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::util::{issue_url, remote_url};
use crate::{history, output, prompt};
use async_trait::async_trait;
use codeagent_core::{EventClass, IssueOrPrNumber, RouterContext, TaskContext, WorkspaceKey};
use codeagent_platform::PlatformClient;
use codeagent_router::ModeHandler;
use codeagent_session::{SessionManager, SessionSpawner};
use codeagent_workspace::{IssueRef, PrRef, WorkspaceManager};
use std::sync::Arc;

pub struct TagHandler<Sp: SessionSpawner> {
    platform: Arc<dyn PlatformClient>,
    workspaces: Arc<WorkspaceManager>,
    sessions: Arc<SessionManager<Sp>>,
    config: HandlerConfig,
}

impl<Sp: SessionSpawner> TagHandler<Sp> {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        workspaces: Arc<WorkspaceManager>,
        sessions: Arc<SessionManager<Sp>>,
        config: HandlerConfig,
    ) -> Self {
        Self { platform, workspaces, sessions, config }
    }

    async fn issue_flow(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let command = ctx.command.as_ref().ok_or(HandlerError::MissingCommand)?;
        let assistant = self.config.default_assistant;

        let lock_key = WorkspaceKey::issue(assistant, ctx.repo.clone(), number);
        let _task_guard = self.workspaces.lock_task(lock_key).await;

        let issue = IssueRef { url: issue_url(&ctx.repo, number), number, remote_url: remote_url(&self.config.remote_base, &ctx.repo) };
        let ws = self.workspaces.create_from_issue(&issue, assistant).await?;
        let branch = ws.branch.clone();

        self.platform.create_branch(&ctx.repo, &branch, "main").await?;
        let pr = self
            .platform
            .open_draft_pr(
                &ctx.repo,
                &branch,
                "main",
                &format!("Implement #{number}"),
                &format!("Closes #{number}\n\nRequested: {}", command.args),
            )
            .await?;

        let mut ws = self.workspaces.move_issue_to_pr(&ws, pr.number).await?;
        let session_parent = ws.path.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| ws.path.clone());
        let session_path = self.workspaces.create_session_path(
            &session_parent,
            assistant,
            &ctx.repo.repo,
            pr.number,
            &ws.created_at.to_string(),
        )?;
        ws.session_path = Some(session_path);
        self.workspaces.register_workspace(ws.clone());

        let prompt = prompt::generation_prompt(number, &command.args);
        let raw_output =
            self.sessions.prompt_with_retry(&ws, &prompt, self.config.max_prompt_attempts, task.cancellation()).await?;
        let parsed = output::parse_output(&raw_output);
        let error_line = output::extract_error(&raw_output);

        let mut body = format!(
            "## Summary\n{}\n\n## Changes\n{}\n\n## Test Plan\n{}\n\n\
             <details><summary>Transcript</summary>\n\n```\n{raw_output}\n```\n\n</details>",
            parsed.summary, parsed.changes, parsed.test_plan,
        );
        if !error_line.is_empty() {
            body.push_str(&format!("\n\n**Error detected:** `{error_line}`"));
        }
        self.platform.update_pr_body(&ctx.repo, pr.number, &body).await?;

        codeagent_git::commit_all(&ws.path, "codeagent: apply generated changes").await?;
        codeagent_git::push(&ws.path, &branch).await?;

        self.platform
            .create_issue_comment(&ctx.repo, pr.number, &format!("Opened #{} to implement this.", pr.number))
            .await?;
        Ok(())
    }

    async fn pr_comment_flow(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let command = ctx.command.as_ref().ok_or(HandlerError::MissingCommand)?;
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
            tracing::warn!(pr = number, error = %e, "pull --rebase failed before prompting, continuing");
        }

        let exclude_id = ctx.comment.as_ref().map(|c| c.id);
        let issue_comments = self.platform.list_issue_comments(&ctx.repo, number).await?;
        let review_comments = self.platform.list_review_comments(&ctx.repo, number).await?;
        let reviews = self.platform.list_reviews(&ctx.repo, number).await?;
        let entries = history::aggregate_history(issue_comments, review_comments, reviews, exclude_id);
        let history_block = history::format_history(&entries);

        let is_fix = command.name == "fix";
        let prompt = if is_fix {
            prompt::fix_prompt(&history_block, &command.args)
        } else {
            prompt::continue_prompt(&history_block, &command.args)
        };

        let raw_output =
            self.sessions.prompt_with_retry(&ws, &prompt, self.config.max_prompt_attempts, task.cancellation()).await?;

        codeagent_git::commit_all(&ws.path, &format!("codeagent: {} PR #{number}", command.name)).await?;
        let push_result = codeagent_git::push(&ws.path, &ws.branch).await;
        if is_fix {
            push_result.map_err(HandlerError::FixPushAborted)?;
        } else if let Err(e) = push_result {
            tracing::warn!(pr = number, error = %e, "push failed in continue mode, posting output anyway");
        }

        self.platform.create_issue_comment(&ctx.repo, number, &raw_output).await?;
        Ok(())
    }

    async fn review_comment_flow(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let command = ctx.command.as_ref().ok_or(HandlerError::MissingCommand)?;
        let comment_ref = ctx.comment.as_ref().ok_or(HandlerError::MissingCommand)?;

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

        let review_comments = self.platform.list_review_comments(&ctx.repo, number).await?;
        let target = review_comments.into_iter().find(|c| c.id == comment_ref.id);
        let (file, line) = target.map(|c| (c.path, c.line)).unwrap_or_default();

        let prompt_text = prompt::review_comment_prompt(&file, line, &comment_ref.body, &command.args);
        let raw_output = self
            .sessions
            .prompt_with_retry(&ws, &prompt_text, self.config.max_prompt_attempts, task.cancellation())
            .await?;

        codeagent_git::commit_all(&ws.path, &format!("codeagent: address review comment on PR #{number}")).await?;
        let _ = codeagent_git::push(&ws.path, &ws.branch).await;

        self.platform.reply_to_review_comment(&ctx.repo, number, comment_ref.id, &raw_output).await?;
        Ok(())
    }

    async fn review_batch_flow(&self, ctx: &RouterContext, number: u64, task: &TaskContext) -> Result<(), HandlerError> {
        let command = ctx.command.as_ref().ok_or(HandlerError::MissingCommand)?;
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
        let _ = &command.args;

        let raw_output = self
            .sessions
            .prompt_with_retry(&ws, &prompt_text, self.config.max_prompt_attempts, task.cancellation())
            .await?;

        codeagent_git::commit_all(&ws.path, &format!("codeagent: address review on PR #{number}")).await?;
        let _ = codeagent_git::push(&ws.path, &ws.branch).await;

        let body = format!("@{} {} comments addressed.\n\n{raw_output}", ctx.actor.login, comments.len());
        self.platform.create_issue_comment(&ctx.repo, number, &body).await?;
        Ok(())
    }
}

#[async_trait]
impl<Sp: SessionSpawner + 'static> ModeHandler for TagHandler<Sp> {
    fn name(&self) -> &str {
        "tag"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn accepts(&self, ctx: &RouterContext) -> bool {
        ctx.command.is_some()
            && matches!(
                ctx.event_class,
                EventClass::IssueComment | EventClass::PullRequestReview | EventClass::PullRequestReviewComment
            )
    }

    async fn execute(
        &self,
        ctx: &RouterContext,
        task: &TaskContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = match (ctx.event_class, ctx.reference) {
            (EventClass::IssueComment, IssueOrPrNumber::Issue(n)) => self.issue_flow(ctx, n, task).await,
            (EventClass::IssueComment, IssueOrPrNumber::Pr(n)) => self.pr_comment_flow(ctx, n, task).await,
            (EventClass::PullRequestReviewComment, IssueOrPrNumber::Pr(n)) => {
                self.review_comment_flow(ctx, n, task).await
            }
            (EventClass::PullRequestReview, IssueOrPrNumber::Pr(n)) => self.review_batch_flow(ctx, n, task).await,
            _ => Err(HandlerError::MissingCommand),
        };
        result.map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
