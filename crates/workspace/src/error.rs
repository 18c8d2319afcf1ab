// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

/// Errors from [`crate::repo_cache::RepoCache`] and
/// [`crate::manager::WorkspaceManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("git operation failed: {0}")]
    Git(#[from] codeagent_git::GitError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory name did not parse: {0}")]
    Naming(#[from] codeagent_core::naming::ParseDirError),
    #[error("no workspace registered for {0}")]
    NotFound(String),
    #[error("{what} missing from repository URL: {url}")]
    MalformedRepoUrl { what: &'static str, url: String },
}

impl ErrorKindExt for WorkspaceError {
    fn kind(&self) -> ErrorKind {
        match self {
            WorkspaceError::Git(_) => ErrorKind::Git,
            WorkspaceError::Io(_) => ErrorKind::Git,
            WorkspaceError::Naming(_) => ErrorKind::Validation,
            WorkspaceError::NotFound(_) => ErrorKind::Validation,
            WorkspaceError::MalformedRepoUrl { .. } => ErrorKind::Validation,
        }
    }
}
