use super::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StaticToken;

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, PlatformError> {
        Ok("test-token".to_string())
    }
}

#[tokio::test]
async fn get_pr_parses_head_and_base_refs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls/101"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "number": 101,
            "head": {"ref": "codeagent/claude/issue-42-1700000000"},
            "base": {"ref": "main"},
            "title": "Add CLI flag",
            "body": "closes #42",
            "html_url": "https://github.com/acme/widget/pull/101",
            "state": "open",
        })))
        .mount(&server)
        .await;

    let client = GithubClient::with_base_url(server.uri(), Arc::new(StaticToken));
    let pr = client.get_pr(&RepoCoord::new("acme", "widget"), 101).await.expect("get_pr succeeds");

    assert_eq!(pr.number, 101);
    assert_eq!(pr.head_ref, "codeagent/claude/issue-42-1700000000");
    assert_eq!(pr.base_ref, "main");
    assert_eq!(pr.state, PrState::Open);
}

#[tokio::test]
async fn not_found_is_surfaced_as_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/pulls/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let client = GithubClient::with_base_url(server.uri(), Arc::new(StaticToken));
    let err = client.get_pr(&RepoCoord::new("acme", "widget"), 999).await.unwrap_err();
    assert!(matches!(err, PlatformError::NotFound(_)));
}

#[tokio::test]
async fn create_issue_comment_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widget/issues/101/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
        .mount(&server)
        .await;

    let client = GithubClient::with_base_url(server.uri(), Arc::new(StaticToken));
    client
        .create_issue_comment(&RepoCoord::new("acme", "widget"), 101, "done")
        .await
        .expect("create comment succeeds");
}
