// SPDX-License-Identifier: Apache-2.0

use crate::subprocess::SubprocessError;
use codeagent_core::{ErrorKind, ErrorKindExt};

/// Errors from [`crate::ops::GitOps`] operations. Every
/// variant here is fatal for the operation that raised it — callers that
/// want a partially-created target directory removed do that themselves
/// before surfacing the error (see `codeagent-workspace::RepoCache`).
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("subprocess error: {0}")]
    Subprocess(#[from] SubprocessError),
    #[error("git command failed (exit {status}): {stderr}")]
    CommandFailed { status: i32, stderr: String },
    #[error("path is not a git repository: {0}")]
    NotARepository(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorKindExt for GitError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Git
    }
}
