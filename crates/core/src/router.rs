// SPDX-License-Identifier: Apache-2.0

//! The pure [`RouterContext`] envelope produced from a raw webhook payload.
//!
//! Parsing a raw payload into this shape lives in `codeagent-router`; this
//! module only defines the value type so both the router and the mode
//! handlers can depend on it without a cycle.

use crate::workspace::RepoCoord;
use serde::{Deserialize, Serialize};

/// The class of webhook event a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventClass {
    IssueComment,
    PullRequestReview,
    PullRequestReviewComment,
    PullRequestOpened,
    PullRequestClosed,
    PullRequestSynchronized,
    Push,
}

/// A reference to the issue or PR an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueOrPrNumber {
    Issue(u64),
    Pr(u64),
}

impl IssueOrPrNumber {
    pub fn number(&self) -> u64 {
        match self {
            IssueOrPrNumber::Issue(n) | IssueOrPrNumber::Pr(n) => *n,
        }
    }
}

/// The actor (platform user) who triggered the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A comment attached to the triggering event, when one exists (issue
/// comments, review comments). `None` for PR opened/synchronized/push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: u64,
    pub body: String,
}

/// A parsed bot command, e.g. `/continue refactor the parser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerCommand {
    pub name: String,
    pub args: String,
}

/// Typed envelope produced from a raw webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterContext {
    pub event_class: EventClass,
    pub delivery_id: String,
    pub repo: RepoCoord,
    pub actor: Actor,
    pub reference: IssueOrPrNumber,
    pub comment: Option<CommentRef>,
    pub command: Option<TriggerCommand>,
    /// Present iff the payload carried `installation.id`; absence implies
    /// personal-token mode for this event.
    pub installation_id: Option<i64>,
}
