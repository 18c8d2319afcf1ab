// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to spawn assistant subprocess: {0}")]
    SpawnFailed(String),
    #[error("failed to write prompt to subprocess stdin: {0}")]
    WriteFailed(String),
    #[error("failed to read subprocess output: {0}")]
    ReadFailed(String),
    #[error("prompt failed after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: usize, #[source] source: Box<SessionError> },
    #[error("request cancelled")]
    Cancelled,
    #[error("prompt_with_retry called with max_attempts=0")]
    NoAttemptsMade,
}

impl ErrorKindExt for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            SessionError::SpawnFailed(_) | SessionError::WriteFailed(_) | SessionError::ReadFailed(_) => {
                ErrorKind::Subprocess
            }
            SessionError::RetriesExhausted { .. } => ErrorKind::Subprocess,
            SessionError::Cancelled => ErrorKind::Validation,
            SessionError::NoAttemptsMade => ErrorKind::Validation,
        }
    }
}
