// SPDX-License-Identifier: Apache-2.0

//! In-memory [`PlatformClient`] for tests, gated behind `test-support`.

use crate::client::PlatformClient;
use crate::error::PlatformError;
use crate::types::{IssueComment, PrDetails, PrState, Review, ReviewComment};
use async_trait::async_trait;
use codeagent_core::RepoCoord;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct State {
    prs: HashMap<u64, PrDetails>,
    issue_comments: HashMap<u64, Vec<IssueComment>>,
    review_comments: HashMap<u64, Vec<ReviewComment>>,
    reviews: HashMap<u64, Vec<Review>>,
    created_branches: Vec<(String, String)>,
    deleted_branches: Vec<String>,
    posted_comments: Vec<(u64, String)>,
    replies: Vec<(u64, u64, String)>,
    pr_body_updates: Vec<(u64, String)>,
    next_pr_number: u64,
}

/// Records every call it receives so tests can assert on the full sequence
/// of platform interactions a flow produced.
#[derive(Default)]
pub struct FakePlatformClient {
    state: Mutex<State>,
}

impl FakePlatformClient {
    pub fn new() -> Self {
        Self { state: Mutex::new(State { next_pr_number: 1, ..Default::default() }) }
    }

    pub fn seed_pr(&self, pr: PrDetails) {
        self.state.lock().prs.insert(pr.number, pr);
    }

    pub fn seed_issue_comments(&self, pr_number: u64, comments: Vec<IssueComment>) {
        self.state.lock().issue_comments.insert(pr_number, comments);
    }

    pub fn seed_review_comments(&self, pr_number: u64, comments: Vec<ReviewComment>) {
        self.state.lock().review_comments.insert(pr_number, comments);
    }

    pub fn seed_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
        self.state.lock().reviews.insert(pr_number, reviews);
    }

    pub fn posted_comments(&self) -> Vec<(u64, String)> {
        self.state.lock().posted_comments.clone()
    }

    pub fn pr_body_updates(&self) -> Vec<(u64, String)> {
        self.state.lock().pr_body_updates.clone()
    }

    pub fn created_branches(&self) -> Vec<(String, String)> {
        self.state.lock().created_branches.clone()
    }

    pub fn deleted_branches(&self) -> Vec<String> {
        self.state.lock().deleted_branches.clone()
    }

    pub fn replies(&self) -> Vec<(u64, u64, String)> {
        self.state.lock().replies.clone()
    }
}

#[async_trait]
impl PlatformClient for FakePlatformClient {
    async fn create_branch(&self, _repo: &RepoCoord, branch: &str, base_ref: &str) -> Result<(), PlatformError> {
        self.state.lock().created_branches.push((branch.to_string(), base_ref.to_string()));
        Ok(())
    }

    async fn open_draft_pr(
        &self,
        _repo: &RepoCoord,
        branch: &str,
        base_ref: &str,
        title: &str,
        body: &str,
    ) -> Result<PrDetails, PlatformError> {
        let mut state = self.state.lock();
        let number = state.next_pr_number;
        state.next_pr_number += 1;
        let pr = PrDetails {
            number,
            head_ref: branch.to_string(),
            base_ref: base_ref.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            html_url: format!("https://github.com/acme/widget/pull/{number}"),
            state: PrState::Open,
        };
        state.prs.insert(number, pr.clone());
        Ok(pr)
    }

    async fn get_pr(&self, _repo: &RepoCoord, number: u64) -> Result<PrDetails, PlatformError> {
        self.state.lock().prs.get(&number).cloned().ok_or_else(|| PlatformError::NotFound(number.to_string()))
    }

    async fn list_issue_comments(&self, _repo: &RepoCoord, number: u64) -> Result<Vec<IssueComment>, PlatformError> {
        Ok(self.state.lock().issue_comments.get(&number).cloned().unwrap_or_default())
    }

    async fn list_review_comments(&self, _repo: &RepoCoord, number: u64) -> Result<Vec<ReviewComment>, PlatformError> {
        Ok(self.state.lock().review_comments.get(&number).cloned().unwrap_or_default())
    }

    async fn list_reviews(&self, _repo: &RepoCoord, number: u64) -> Result<Vec<Review>, PlatformError> {
        Ok(self.state.lock().reviews.get(&number).cloned().unwrap_or_default())
    }

    async fn list_comments_for_review(
        &self,
        _repo: &RepoCoord,
        number: u64,
        review_id: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError> {
        Ok(self
            .state
            .lock()
            .review_comments
            .get(&number)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|c| c.review_id == Some(review_id))
            .collect())
    }

    async fn create_issue_comment(&self, _repo: &RepoCoord, number: u64, body: &str) -> Result<(), PlatformError> {
        self.state.lock().posted_comments.push((number, body.to_string()));
        Ok(())
    }

    async fn reply_to_review_comment(
        &self,
        _repo: &RepoCoord,
        number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.state.lock().replies.push((number, comment_id, body.to_string()));
        Ok(())
    }

    async fn update_pr_body(&self, _repo: &RepoCoord, number: u64, body: &str) -> Result<(), PlatformError> {
        self.state.lock().pr_body_updates.push((number, body.to_string()));
        if let Some(pr) = self.state.lock().prs.get_mut(&number) {
            pr.body = body.to_string();
        }
        Ok(())
    }

    async fn delete_branch(&self, _repo: &RepoCoord, branch: &str) -> Result<(), PlatformError> {
        self.state.lock().deleted_branches.push(branch.to_string());
        Ok(())
    }
}
