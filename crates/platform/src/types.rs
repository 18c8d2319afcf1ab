// SPDX-License-Identifier: Apache-2.0

//! Value types for the platform REST operations the core consumes.
//! The platform's REST/GraphQL client itself is out of scope here; these
//! shapes exist only so the core's handlers have something
//! concrete to build prompts and comments from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrDetails {
    pub number: u64,
    pub head_ref: String,
    pub base_ref: String,
    pub title: String,
    pub body: String,
    pub html_url: String,
    pub state: PrState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub review_id: Option<u64>,
    pub author: String,
    pub body: String,
    pub path: String,
    pub line: Option<u64>,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub created_at: u64,
}

/// A chronologically-ordered mix of the three comment-ish history sources a
/// PR-comment flow aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    IssueComment(IssueComment),
    Review(Review),
    ReviewComment(ReviewComment),
}

impl HistoryEntry {
    pub fn created_at(&self) -> u64 {
        match self {
            HistoryEntry::IssueComment(c) => c.created_at,
            HistoryEntry::Review(r) => r.created_at,
            HistoryEntry::ReviewComment(c) => c.created_at,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            HistoryEntry::IssueComment(c) => &c.author,
            HistoryEntry::Review(r) => &r.author,
            HistoryEntry::ReviewComment(c) => &c.author,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            HistoryEntry::IssueComment(c) => &c.body,
            HistoryEntry::Review(r) => &r.body,
            HistoryEntry::ReviewComment(c) => &c.body,
        }
    }
}
