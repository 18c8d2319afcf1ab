use super::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn exchanges_jwt_for_installation_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/app/installations/42/access_tokens"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "token": "ghs_abc123",
            "expires_at": "2026-07-28T19:00:00Z",
            "token_type": "bearer",
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let token = exchange(&client, &server.uri(), "test-jwt", 42, &ExchangeScope::default())
        .await
        .expect("exchange succeeds");

    assert_eq!(token.token, "ghs_abc123");
    assert_eq!(token.installation_id, 42);
    assert!(token.expires_at > 0);
}

#[tokio::test]
async fn rejects_non_positive_installation_id() {
    let client = reqwest::Client::new();
    let err = exchange(&client, "http://unused", "jwt", 0, &ExchangeScope::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidInstallationId(0)));
}

#[tokio::test]
async fn surfaces_unauthorized_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/app/installations/7/access_tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad jwt"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = exchange(&client, &server.uri(), "stale-jwt", 7, &ExchangeScope::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::Unauthorized(_)));
}

#[tokio::test]
async fn surfaces_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/app/installations/7/access_tokens"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = exchange(&client, &server.uri(), "jwt", 7, &ExchangeScope::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::RateLimited { retry_after_secs: Some(30) }));
}

#[test]
fn parses_rfc3339_into_epoch_seconds() {
    // 2026-07-28T19:00:00Z, cross-checked against `date -u -d ... +%s`.
    assert_eq!(parse_rfc3339_secs("2026-07-28T19:00:00Z"), Some(1_785_265_200));
    assert_eq!(parse_rfc3339_secs("1970-01-01T00:00:00Z"), Some(0));
    assert_eq!(parse_rfc3339_secs("not-a-timestamp"), None);
}
