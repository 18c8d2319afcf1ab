// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// An event type this router doesn't parse. Callers treat this as a
    /// debug-level skip, not a failure.
    #[error("unsupported event type: {0}")]
    Unsupported(String),
    #[error("payload missing required field: {0}")]
    MissingField(&'static str),
    #[error("no handler accepted the event")]
    NoHandler,
    #[error("handler {name} failed: {source}")]
    HandlerFailed { name: String, source: Box<dyn std::error::Error + Send + Sync> },
}

impl ErrorKindExt for RouterError {
    fn kind(&self) -> ErrorKind {
        match self {
            RouterError::Unsupported(_) | RouterError::MissingField(_) => ErrorKind::Validation,
            RouterError::NoHandler => ErrorKind::Validation,
            RouterError::HandlerFailed { .. } => ErrorKind::TransientUpstream,
        }
    }
}
