// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("workspace error: {0}")]
    Workspace(#[from] codeagent_workspace::WorkspaceError),
    #[error("session error: {0}")]
    Session(#[from] codeagent_session::SessionError),
    #[error("platform error: {0}")]
    Platform(#[from] codeagent_platform::PlatformError),
    #[error("git error: {0}")]
    Git(#[from] codeagent_git::GitError),
    #[error("event carried no recognized trigger command")]
    MissingCommand,
    #[error("could not determine an assistant for this event")]
    NoAssistant,
    #[error("fix push failed, aborting: {0}")]
    FixPushAborted(#[source] codeagent_git::GitError),
}

impl ErrorKindExt for HandlerError {
    fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Workspace(e) => e.kind(),
            HandlerError::Session(e) => e.kind(),
            HandlerError::Platform(e) => e.kind(),
            HandlerError::Git(e) => e.kind(),
            HandlerError::FixPushAborted(_) => ErrorKind::Git,
            HandlerError::MissingCommand | HandlerError::NoAssistant => ErrorKind::Validation,
        }
    }
}
