// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("platform returned {status}: {body}")]
    Unexpected { status: u16, body: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("not found: {0}")]
    NotFound(String),
}

impl ErrorKindExt for PlatformError {
    fn kind(&self) -> ErrorKind {
        match self {
            PlatformError::Request(_) => ErrorKind::TransientUpstream,
            PlatformError::Unexpected { status, .. } if (500..600).contains(status) => {
                ErrorKind::TransientUpstream
            }
            PlatformError::Unexpected { .. } => ErrorKind::Validation,
            PlatformError::Unauthorized(_) => ErrorKind::Auth,
            PlatformError::RateLimited { .. } => ErrorKind::RateLimited,
            PlatformError::NotFound(_) => ErrorKind::Validation,
        }
    }
}
