use super::*;
use serde_json::json;

fn issue_comment_payload(body: &str, is_pr: bool) -> serde_json::Value {
    let mut issue = json!({"number": 42});
    if is_pr {
        issue["pull_request"] = json!({"url": "https://api.github.com/repos/acme/widget/pulls/42"});
    }
    json!({
        "action": "created",
        "issue": issue,
        "comment": {"id": 1001, "body": body},
        "repository": {"name": "widget", "owner": {"login": "acme"}},
        "sender": {"login": "octofan"},
        "installation": {"id": 777},
    })
}

#[test]
fn parses_issue_comment_with_recognized_command() {
    let payload = issue_comment_payload("/code please add a CLI flag", false);
    let ctx = parse("issue_comment", "delivery-1", &payload).expect("parses");

    assert_eq!(ctx.event_class, EventClass::IssueComment);
    assert_eq!(ctx.reference, IssueOrPrNumber::Issue(42));
    assert_eq!(ctx.repo, RepoCoord::new("acme", "widget"));
    assert_eq!(ctx.actor.login, "octofan");
    assert_eq!(ctx.installation_id, Some(777));
    let command = ctx.command.expect("command parsed");
    assert_eq!(command.name, "code");
    assert_eq!(command.args, "please add a CLI flag");
}

#[test]
fn issue_comment_on_a_pr_is_classified_as_pr_reference() {
    let payload = issue_comment_payload("/continue refactor X", true);
    let ctx = parse("issue_comment", "delivery-2", &payload).expect("parses");
    assert_eq!(ctx.reference, IssueOrPrNumber::Pr(42));
    assert_eq!(ctx.command.expect("command").name, "continue");
}

#[test]
fn unrecognized_command_leaves_command_none() {
    let payload = issue_comment_payload("just a regular comment", false);
    let ctx = parse("issue_comment", "delivery-3", &payload).expect("parses");
    assert!(ctx.command.is_none());
}

#[test]
fn missing_installation_id_implies_personal_token_mode() {
    let mut payload = issue_comment_payload("/fix it", false);
    payload.as_object_mut().expect("object").remove("installation");
    let ctx = parse("issue_comment", "delivery-4", &payload).expect("parses");
    assert_eq!(ctx.installation_id, None);
}

#[test]
fn unknown_event_type_is_unsupported() {
    let payload = json!({});
    let err = parse("deployment_status", "delivery-5", &payload).unwrap_err();
    assert!(matches!(err, RouterError::Unsupported(ref s) if s == "deployment_status"));
}

#[test]
fn pull_request_action_maps_to_event_class() {
    let base = json!({
        "pull_request": {"number": 101},
        "repository": {"name": "widget", "owner": {"login": "acme"}},
        "sender": {"login": "octofan"},
    });

    let mut opened = base.clone();
    opened["action"] = json!("opened");
    assert_eq!(
        parse("pull_request", "d", &opened).expect("parses").event_class,
        EventClass::PullRequestOpened
    );

    let mut closed = base.clone();
    closed["action"] = json!("closed");
    assert_eq!(
        parse("pull_request", "d", &closed).expect("parses").event_class,
        EventClass::PullRequestClosed
    );

    let mut synced = base;
    synced["action"] = json!("synchronize");
    assert_eq!(
        parse("pull_request", "d", &synced).expect("parses").event_class,
        EventClass::PullRequestSynchronized
    );
}

#[test]
fn pull_request_review_submitted_parses_review_body_as_comment() {
    let payload = json!({
        "action": "submitted",
        "pull_request": {"number": 101},
        "review": {"id": 55, "body": "/fix needs work"},
        "repository": {"name": "widget", "owner": {"login": "acme"}},
        "sender": {"login": "reviewer1"},
    });
    let ctx = parse("pull_request_review", "d", &payload).expect("parses");
    assert_eq!(ctx.event_class, EventClass::PullRequestReview);
    assert_eq!(ctx.reference, IssueOrPrNumber::Pr(101));
    assert_eq!(ctx.comment.expect("comment").id, 55);
    assert_eq!(ctx.command.expect("command").name, "fix");
}

#[test]
fn missing_required_field_is_rejected() {
    let payload = json!({"action": "created", "repository": {"name": "widget", "owner": {"login": "acme"}}, "sender": {"login": "x"}});
    let err = parse("issue_comment", "d", &payload).unwrap_err();
    assert!(matches!(err, RouterError::MissingField("issue")));
}
