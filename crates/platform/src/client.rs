// SPDX-License-Identifier: Apache-2.0

//! The platform REST operations the core consumes. The platform itself is
//! authoritative and its client implementation is out of scope here; this
//! trait is the seam the core's handlers depend on instead of a concrete
//! HTTP client.

use crate::error::PlatformError;
use crate::types::{IssueComment, PrDetails, Review, ReviewComment};
use async_trait::async_trait;
use codeagent_core::RepoCoord;

#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn create_branch(
        &self,
        repo: &RepoCoord,
        branch: &str,
        base_ref: &str,
    ) -> Result<(), PlatformError>;

    async fn open_draft_pr(
        &self,
        repo: &RepoCoord,
        branch: &str,
        base_ref: &str,
        title: &str,
        body: &str,
    ) -> Result<PrDetails, PlatformError>;

    async fn get_pr(&self, repo: &RepoCoord, number: u64) -> Result<PrDetails, PlatformError>;

    async fn list_issue_comments(
        &self,
        repo: &RepoCoord,
        number: u64,
    ) -> Result<Vec<IssueComment>, PlatformError>;

    async fn list_review_comments(
        &self,
        repo: &RepoCoord,
        number: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError>;

    async fn list_reviews(&self, repo: &RepoCoord, number: u64) -> Result<Vec<Review>, PlatformError>;

    async fn list_comments_for_review(
        &self,
        repo: &RepoCoord,
        number: u64,
        review_id: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError>;

    async fn create_issue_comment(
        &self,
        repo: &RepoCoord,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    async fn reply_to_review_comment(
        &self,
        repo: &RepoCoord,
        number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    async fn update_pr_body(&self, repo: &RepoCoord, number: u64, body: &str) -> Result<(), PlatformError>;

    async fn delete_branch(&self, repo: &RepoCoord, branch: &str) -> Result<(), PlatformError>;
}
