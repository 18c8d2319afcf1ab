// SPDX-License-Identifier: Apache-2.0

//! Workspace identity and the pure [`Workspace`] record.
//!
//! A Workspace is the primary entity of the pipeline: one checkout for one
//! assistant on one task. Identity is the tuple `(assistant, org, repo, kind,
//! number)`; at most one Workspace is registered per identity at a time
//! (enforced by `codeagent-workspace::WorkspaceManager`, not here).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The external assistant CLI bound to a workspace.
///
/// Kept as a finite, known set rather than an arbitrary string so that
/// [`Assistant::from_branch`] can reject unrecognized names per spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assistant {
    Claude,
    Gemini,
}

impl Assistant {
    pub const ALL: &'static [Assistant] = &[Assistant::Claude, Assistant::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Assistant::Claude => "claude",
            Assistant::Gemini => "gemini",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a Workspace originated from an issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
    Issue,
    Pr,
}

/// Coordinates identifying one repository on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoord {
    pub org: String,
    pub repo: String,
}

impl RepoCoord {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self { org: org.into(), repo: repo.into() }
    }
}

impl fmt::Display for RepoCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

/// Identity tuple a Workspace is registered under: `(assistant, org, repo,
/// kind, number)`. Issue- and PR-derived workspaces share one consistent
/// keying scheme, [`WorkspaceKey`], rather than two independently-keyed
/// registries — see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceKey {
    pub assistant: Assistant,
    pub repo: RepoCoord,
    pub kind: WorkspaceKind,
    pub number: u64,
}

impl WorkspaceKey {
    pub fn new(assistant: Assistant, repo: RepoCoord, kind: WorkspaceKind, number: u64) -> Self {
        Self { assistant, repo, kind, number }
    }

    pub fn pr(assistant: Assistant, repo: RepoCoord, number: u64) -> Self {
        Self::new(assistant, repo, WorkspaceKind::Pr, number)
    }

    pub fn issue(assistant: Assistant, repo: RepoCoord, number: u64) -> Self {
        Self::new(assistant, repo, WorkspaceKind::Issue, number)
    }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WorkspaceKind::Issue => write!(f, "{}/{}/issue-{}", self.assistant, self.repo, self.number),
            WorkspaceKind::Pr => write!(f, "{}/{}/{}", self.assistant, self.repo, self.number),
        }
    }
}

/// A self-contained checkout for one task and one assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub key: WorkspaceKey,
    /// Absolute path to the working tree on disk.
    pub path: PathBuf,
    /// The git branch this working tree is checked out on.
    pub branch: String,
    /// Session-state directory, created lazily; empty until a Session exists.
    pub session_path: Option<PathBuf>,
    /// Clone URL of the repository this workspace was derived from.
    pub remote_url: String,
    /// Seconds since the epoch at creation time.
    pub created_at: u64,
}

impl Workspace {
    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
