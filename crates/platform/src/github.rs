// SPDX-License-Identifier: Apache-2.0

//! A thin `reqwest`-based [`PlatformClient`] against the real GitHub REST
//! API. The wire format and endpoint shapes are GitHub's; nothing here is
//! specified beyond its operation list, so this exists
//! only to give the daemon something to run against, not as the
//! specification's subject matter.

use crate::client::PlatformClient;
use crate::error::PlatformError;
use crate::types::{IssueComment, PrDetails, PrState, Review, ReviewComment};
use async_trait::async_trait;
use codeagent_core::RepoCoord;
use serde_json::json;
use std::sync::Arc;

/// Mints the bearer token for a single request. Implemented by
/// `codeagent-credentials::CredentialManager` in the daemon wiring; kept as
/// a trait here so this crate doesn't depend on the credentials crate.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, PlatformError>;
}

pub struct GithubClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl GithubClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_base_url("https://api.github.com", tokens)
    }

    pub fn with_base_url(base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new(), tokens }
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, PlatformError> {
        let token = self.tokens.token().await?;
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "codeagent");
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        classify(response).await
    }
}

async fn classify(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs =
            response.headers().get("retry-after").and_then(|v| v.to_str().ok()).and_then(|v| v.parse().ok());
        return Err(PlatformError::RateLimited { retry_after_secs });
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(PlatformError::Unauthorized(body));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        let body = response.text().await.unwrap_or_default();
        return Err(PlatformError::NotFound(body));
    }
    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::Unexpected { status: status.as_u16(), body })
}

fn pr_from_json(v: &serde_json::Value) -> PrDetails {
    PrDetails {
        number: v.get("number").and_then(serde_json::Value::as_u64).unwrap_or_default(),
        head_ref: v
            .get("head")
            .and_then(|h| h.get("ref"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        base_ref: v
            .get("base")
            .and_then(|b| b.get("ref"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: v.get("title").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
        body: v.get("body").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
        html_url: v.get("html_url").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
        state: if v.get("state").and_then(serde_json::Value::as_str) == Some("closed") {
            PrState::Closed
        } else {
            PrState::Open
        },
    }
}

#[async_trait]
impl PlatformClient for GithubClient {
    async fn create_branch(&self, repo: &RepoCoord, branch: &str, base_ref: &str) -> Result<(), PlatformError> {
        let refs_path = format!("/repos/{}/{}/git/ref/heads/{}", repo.org, repo.repo, base_ref);
        let base = self.request(reqwest::Method::GET, &refs_path, None).await?;
        let base_json: serde_json::Value = base.json().await?;
        let sha = base_json
            .get("object")
            .and_then(|o| o.get("sha"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        let path = format!("/repos/{}/{}/git/refs", repo.org, repo.repo);
        self.request(
            reqwest::Method::POST,
            &path,
            Some(json!({ "ref": format!("refs/heads/{branch}"), "sha": sha })),
        )
        .await?;
        Ok(())
    }

    async fn open_draft_pr(
        &self,
        repo: &RepoCoord,
        branch: &str,
        base_ref: &str,
        title: &str,
        body: &str,
    ) -> Result<PrDetails, PlatformError> {
        let path = format!("/repos/{}/{}/pulls", repo.org, repo.repo);
        let response = self
            .request(
                reqwest::Method::POST,
                &path,
                Some(json!({ "title": title, "head": branch, "base": base_ref, "body": body, "draft": true })),
            )
            .await?;
        let json: serde_json::Value = response.json().await?;
        Ok(pr_from_json(&json))
    }

    async fn get_pr(&self, repo: &RepoCoord, number: u64) -> Result<PrDetails, PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}", repo.org, repo.repo);
        let response = self.request(reqwest::Method::GET, &path, None).await?;
        let json: serde_json::Value = response.json().await?;
        Ok(pr_from_json(&json))
    }

    async fn list_issue_comments(&self, repo: &RepoCoord, number: u64) -> Result<Vec<IssueComment>, PlatformError> {
        let path = format!("/repos/{}/{}/issues/{number}/comments", repo.org, repo.repo);
        let response = self.request(reqwest::Method::GET, &path, None).await?;
        let json: Vec<serde_json::Value> = response.json().await?;
        Ok(json
            .iter()
            .map(|c| IssueComment {
                id: c.get("id").and_then(serde_json::Value::as_u64).unwrap_or_default(),
                author: c
                    .get("user")
                    .and_then(|u| u.get("login"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                body: c.get("body").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
                created_at: 0,
            })
            .collect())
    }

    async fn list_review_comments(&self, repo: &RepoCoord, number: u64) -> Result<Vec<ReviewComment>, PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}/comments", repo.org, repo.repo);
        let response = self.request(reqwest::Method::GET, &path, None).await?;
        let json: Vec<serde_json::Value> = response.json().await?;
        Ok(json.iter().map(review_comment_from_json).collect())
    }

    async fn list_reviews(&self, repo: &RepoCoord, number: u64) -> Result<Vec<Review>, PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}/reviews", repo.org, repo.repo);
        let response = self.request(reqwest::Method::GET, &path, None).await?;
        let json: Vec<serde_json::Value> = response.json().await?;
        Ok(json
            .iter()
            .map(|r| Review {
                id: r.get("id").and_then(serde_json::Value::as_u64).unwrap_or_default(),
                author: r
                    .get("user")
                    .and_then(|u| u.get("login"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                body: r.get("body").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
                created_at: 0,
            })
            .collect())
    }

    async fn list_comments_for_review(
        &self,
        repo: &RepoCoord,
        number: u64,
        review_id: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}/reviews/{review_id}/comments", repo.org, repo.repo);
        let response = self.request(reqwest::Method::GET, &path, None).await?;
        let json: Vec<serde_json::Value> = response.json().await?;
        Ok(json.iter().map(review_comment_from_json).collect())
    }

    async fn create_issue_comment(&self, repo: &RepoCoord, number: u64, body: &str) -> Result<(), PlatformError> {
        let path = format!("/repos/{}/{}/issues/{number}/comments", repo.org, repo.repo);
        self.request(reqwest::Method::POST, &path, Some(json!({ "body": body }))).await?;
        Ok(())
    }

    async fn reply_to_review_comment(
        &self,
        repo: &RepoCoord,
        number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}/comments/{comment_id}/replies", repo.org, repo.repo);
        self.request(reqwest::Method::POST, &path, Some(json!({ "body": body }))).await?;
        Ok(())
    }

    async fn update_pr_body(&self, repo: &RepoCoord, number: u64, body: &str) -> Result<(), PlatformError> {
        let path = format!("/repos/{}/{}/pulls/{number}", repo.org, repo.repo);
        self.request(reqwest::Method::PATCH, &path, Some(json!({ "body": body }))).await?;
        Ok(())
    }

    async fn delete_branch(&self, repo: &RepoCoord, branch: &str) -> Result<(), PlatformError> {
        let path = format!("/repos/{}/{}/git/refs/heads/{branch}", repo.org, repo.repo);
        self.request(reqwest::Method::DELETE, &path, None).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

fn review_comment_from_json(c: &serde_json::Value) -> ReviewComment {
    ReviewComment {
        id: c.get("id").and_then(serde_json::Value::as_u64).unwrap_or_default(),
        review_id: c.get("pull_request_review_id").and_then(serde_json::Value::as_u64),
        author: c
            .get("user")
            .and_then(|u| u.get("login"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        body: c.get("body").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
        path: c.get("path").and_then(serde_json::Value::as_str).unwrap_or_default().to_string(),
        line: c.get("line").and_then(serde_json::Value::as_u64),
        created_at: 0,
    }
}
