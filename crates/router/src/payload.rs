// SPDX-License-Identifier: Apache-2.0

//! Parses a raw webhook payload into a [`RouterContext`].
//!
//! The platform's webhook signature verification and HTTP front-door are
//! out of scope here; this module starts from an already-verified
//! `(event_type, delivery_id, body)` triple.

use crate::error::RouterError;
use codeagent_core::{Actor, CommentRef, EventClass, IssueOrPrNumber, RouterContext, TriggerCommand, RepoCoord};
use serde_json::Value;

/// Known slash commands the trigger parser recognizes. Anything else is
/// left as `command: None` — handlers decide whether an untagged comment is
/// still actionable (e.g. a whole-review fallback).
const KNOWN_COMMANDS: &[&str] = &["code", "continue", "fix"];

/// Parses `raw` according to `event_type` (the platform's `X-GitHub-Event`-
/// style header value) into a typed [`RouterContext`].
///
/// Unknown `event_type` values return [`RouterError::Unsupported`], which
/// callers must treat as a debug-level skip, not a failure.
pub fn parse(event_type: &str, delivery_id: &str, raw: &Value) -> Result<RouterContext, RouterError> {
    let event_class = match event_type {
        "issue_comment" => EventClass::IssueComment,
        "pull_request_review" => EventClass::PullRequestReview,
        "pull_request_review_comment" => EventClass::PullRequestReviewComment,
        "pull_request" => classify_pull_request(raw)?,
        "push" => EventClass::Push,
        other => return Err(RouterError::Unsupported(other.to_string())),
    };

    let repo = parse_repo(raw)?;
    let actor = parse_actor(raw)?;
    let reference = parse_reference(event_class, raw)?;
    let comment = parse_comment(event_class, raw);
    let command = comment.as_ref().and_then(|c| parse_command(&c.body));
    let installation_id = raw.get("installation").and_then(|i| i.get("id")).and_then(Value::as_i64);

    Ok(RouterContext {
        event_class,
        delivery_id: delivery_id.to_string(),
        repo,
        actor,
        reference,
        comment,
        command,
        installation_id,
    })
}

fn classify_pull_request(raw: &Value) -> Result<EventClass, RouterError> {
    match raw.get("action").and_then(Value::as_str) {
        Some("opened" | "reopened") => Ok(EventClass::PullRequestOpened),
        Some("closed") => Ok(EventClass::PullRequestClosed),
        Some("synchronize") => Ok(EventClass::PullRequestSynchronized),
        Some(other) => Err(RouterError::Unsupported(format!("pull_request.{other}"))),
        None => Err(RouterError::MissingField("action")),
    }
}

fn parse_repo(raw: &Value) -> Result<RepoCoord, RouterError> {
    let repo = raw.get("repository").ok_or(RouterError::MissingField("repository"))?;
    let org = repo
        .get("owner")
        .and_then(|o| o.get("login"))
        .and_then(Value::as_str)
        .ok_or(RouterError::MissingField("repository.owner.login"))?;
    let name = repo
        .get("name")
        .and_then(Value::as_str)
        .ok_or(RouterError::MissingField("repository.name"))?;
    Ok(RepoCoord::new(org, name))
}

fn parse_actor(raw: &Value) -> Result<Actor, RouterError> {
    let login = raw
        .get("sender")
        .and_then(|s| s.get("login"))
        .and_then(Value::as_str)
        .ok_or(RouterError::MissingField("sender.login"))?;
    Ok(Actor { login: login.to_string() })
}

fn parse_reference(event_class: EventClass, raw: &Value) -> Result<IssueOrPrNumber, RouterError> {
    match event_class {
        EventClass::IssueComment => {
            let issue = raw.get("issue").ok_or(RouterError::MissingField("issue"))?;
            let number = issue
                .get("number")
                .and_then(Value::as_u64)
                .ok_or(RouterError::MissingField("issue.number"))?;
            if issue.get("pull_request").is_some() {
                Ok(IssueOrPrNumber::Pr(number))
            } else {
                Ok(IssueOrPrNumber::Issue(number))
            }
        }
        EventClass::PullRequestReview | EventClass::PullRequestReviewComment => {
            let number = raw
                .get("pull_request")
                .and_then(|pr| pr.get("number"))
                .and_then(Value::as_u64)
                .ok_or(RouterError::MissingField("pull_request.number"))?;
            Ok(IssueOrPrNumber::Pr(number))
        }
        EventClass::PullRequestOpened
        | EventClass::PullRequestClosed
        | EventClass::PullRequestSynchronized => {
            let number = raw
                .get("pull_request")
                .and_then(|pr| pr.get("number"))
                .and_then(Value::as_u64)
                .ok_or(RouterError::MissingField("pull_request.number"))?;
            Ok(IssueOrPrNumber::Pr(number))
        }
        EventClass::Push => Ok(IssueOrPrNumber::Issue(0)),
    }
}

fn parse_comment(event_class: EventClass, raw: &Value) -> Option<CommentRef> {
    let node = match event_class {
        EventClass::IssueComment => raw.get("comment"),
        EventClass::PullRequestReviewComment => raw.get("comment"),
        EventClass::PullRequestReview => raw.get("review"),
        _ => None,
    }?;
    let id = node.get("id").and_then(Value::as_u64)?;
    let body = node.get("body").and_then(Value::as_str).unwrap_or("").to_string();
    Some(CommentRef { id, body })
}

/// Recognizes a leading `/command args` line. Case-sensitive, matching the
/// literal command tokens the platform users type.
fn parse_command(body: &str) -> Option<TriggerCommand> {
    let first_line = body.lines().next()?.trim();
    let rest = first_line.strip_prefix('/')?;
    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if !KNOWN_COMMANDS.contains(&name) {
        return None;
    }
    Some(TriggerCommand { name: name.to_string(), args: args.trim().to_string() })
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
