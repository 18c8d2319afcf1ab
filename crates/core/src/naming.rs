// SPDX-License-Identifier: Apache-2.0

//! Pure name synthesis/parsing for workspace, session, and cache directories.
//!
//! Directory names encode `(assistant, repo, kind, number, timestamp)` as a
//! single path segment so the rest of the system can recover a Workspace's
//! identity from disk alone (see [`crate::naming::parse_pr_dir`] and
//! startup recovery in `codeagent-workspace`).
//!
//! The separator is a literal double-underscore, chosen so that splitting on
//! it stays unambiguous even when `repo` itself contains single hyphens or
//! underscores. Names are otherwise opaque to git/the filesystem.

use thiserror::Error;

const SEP: &str = "__";

/// A parsed directory name, without the leading kind marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDir {
    pub assistant: String,
    pub repo: String,
    pub number: u64,
    pub timestamp: u64,
}

/// Errors returned when a directory name does not match the expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDirError {
    #[error("expected {expected} tokens separated by `__`, found {found}")]
    WrongTokenCount { expected: usize, found: usize },
    #[error("expected marker `{expected}` at position {position}, found `{found}`")]
    WrongMarker { expected: &'static str, position: usize, found: String },
    #[error("invalid number token `{0}`")]
    InvalidNumber(String),
    #[error("invalid timestamp token `{0}`")]
    InvalidTimestamp(String),
}

/// `{assistant}__{repo}__issue__{n}__{ts}`
pub fn issue_dir(assistant: &str, repo: &str, n: u64, ts: u64) -> String {
    format!("{assistant}{SEP}{repo}{SEP}issue{SEP}{n}{SEP}{ts}")
}

/// `{assistant}__{repo}__pr__{n}__{ts}`
pub fn pr_dir(assistant: &str, repo: &str, n: u64, ts: u64) -> String {
    format!("{assistant}{SEP}{repo}{SEP}pr{SEP}{n}{SEP}{ts}")
}

/// `{assistant}__{repo}__session__{n}__{ts}`
pub fn session_dir(assistant: &str, repo: &str, n: u64, ts: u64) -> String {
    format!("{assistant}{SEP}{repo}{SEP}session{SEP}{n}{SEP}{ts}")
}

fn parse_marked(name: &str, marker: &'static str) -> Result<ParsedDir, ParseDirError> {
    let tokens: Vec<&str> = name.split(SEP).collect();
    if tokens.len() != 5 {
        return Err(ParseDirError::WrongTokenCount { expected: 5, found: tokens.len() });
    }
    let [assistant, repo, found_marker, n, ts] = tokens.as_slice() else {
        unreachable!("length checked above")
    };
    if *found_marker != marker {
        return Err(ParseDirError::WrongMarker {
            expected: marker,
            position: 2,
            found: found_marker.to_string(),
        });
    }
    let number: u64 = n.parse().map_err(|_| ParseDirError::InvalidNumber(n.to_string()))?;
    let timestamp: u64 = ts.parse().map_err(|_| ParseDirError::InvalidTimestamp(ts.to_string()))?;
    Ok(ParsedDir { assistant: assistant.to_string(), repo: repo.to_string(), number, timestamp })
}

/// Parse a name produced by [`pr_dir`]. Rejects anything not matching
/// exactly 5 `__`-separated tokens with the literal marker `pr` in position 3.
pub fn parse_pr_dir(name: &str) -> Result<ParsedDir, ParseDirError> {
    parse_marked(name, "pr")
}

/// Parse a name produced by [`issue_dir`].
pub fn parse_issue_dir(name: &str) -> Result<ParsedDir, ParseDirError> {
    parse_marked(name, "issue")
}

/// Parse a name produced by [`session_dir`].
pub fn parse_session_dir(name: &str) -> Result<ParsedDir, ParseDirError> {
    parse_marked(name, "session")
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
