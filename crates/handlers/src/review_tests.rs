// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::test_support::{Fixture, FakeSpawner};
use codeagent_core::{Actor, CommentRef, EventClass, IssueOrPrNumber, RepoCoord, TaskContext, TriggerCommand};
use codeagent_platform::{FakePlatformClient, PrDetails, PrState, ReviewComment};
use codeagent_session::SessionManager;
use codeagent_workspace::{RepoCache, WorkspaceManager};

fn repo() -> RepoCoord {
    RepoCoord::new("acme", "widget")
}

#[test]
fn accepts_review_events_without_a_command_only() {
    let handler: ReviewHandler<FakeSpawner> = ReviewHandler::new(
        Arc::new(FakePlatformClient::new()),
        Arc::new(WorkspaceManager::new("/tmp/does-not-matter", RepoCache::new("/tmp/does-not-matter"))),
        Arc::new(SessionManager::new(FakeSpawner::new(""))),
        HandlerConfig::default(),
    );
    let base = RouterContext {
        event_class: EventClass::PullRequestReview,
        delivery_id: "d".into(),
        repo: repo(),
        actor: Actor { login: "dana".into() },
        reference: IssueOrPrNumber::Pr(1),
        comment: Some(CommentRef { id: 1, body: "lgtm with nits".into() }),
        command: None,
        installation_id: None,
    };
    assert!(handler.accepts(&base));

    let mut with_command = base.clone();
    with_command.command = Some(TriggerCommand { name: "fix".into(), args: String::new() });
    assert!(!handler.accepts(&with_command), "tag handler owns commanded reviews, not this one");

    let mut wrong_class = base;
    wrong_class.event_class = EventClass::IssueComment;
    assert!(!handler.accepts(&wrong_class));
}

/// A plain (uncommanded) whole-review submission still batches every
/// attached line comment into one prompt and posts one aggregate comment.
#[tokio::test]
async fn uncommanded_review_batches_comments_into_one_prompt() {
    let fixture = Fixture::new("acme", "widget").await;
    let config = HandlerConfig { remote_base: fixture.remote_base(), ..Default::default() };

    let workspaces =
        Arc::new(WorkspaceManager::new(fixture.workspace_base.path(), RepoCache::new(fixture.workspace_base.path())));
    let sessions = Arc::new(SessionManager::new(FakeSpawner::new("reviewed and updated")));
    let platform = Arc::new(FakePlatformClient::new());
    platform.seed_pr(PrDetails {
        number: 12,
        head_ref: "main".into(),
        base_ref: "main".into(),
        title: "t".into(),
        body: String::new(),
        html_url: String::new(),
        state: PrState::Open,
    });
    platform.seed_review_comments(
        12,
        vec![
            ReviewComment {
                id: 1,
                review_id: Some(77),
                author: "dana".into(),
                body: "nit".into(),
                path: "a.rs".into(),
                line: Some(4),
                created_at: 1,
            },
            ReviewComment {
                id: 2,
                review_id: Some(77),
                author: "dana".into(),
                body: "nit2".into(),
                path: "b.rs".into(),
                line: Some(8),
                created_at: 2,
            },
        ],
    );

    let handler = ReviewHandler::new(platform.clone(), workspaces, sessions, config);
    let ctx = RouterContext {
        event_class: EventClass::PullRequestReview,
        delivery_id: "d".into(),
        repo: repo(),
        actor: Actor { login: "dana".into() },
        reference: IssueOrPrNumber::Pr(12),
        comment: Some(CommentRef { id: 77, body: "lgtm with nits".into() }),
        command: None,
        installation_id: None,
    };

    handler.execute(&ctx, &TaskContext::default()).await.expect("review flow succeeds");

    let comments = platform.posted_comments();
    assert_eq!(comments.len(), 1);
    let (pr, body) = &comments[0];
    assert_eq!(*pr, 12);
    assert!(body.contains("@dana"));
    assert!(body.contains("2 comments"));
}
