// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid installation id: {0}")]
    InvalidInstallationId(i64),
    #[error("failed to sign JWT: {0}")]
    JwtSigning(#[from] jsonwebtoken::errors::Error),
    #[error("invalid app private key: {0}")]
    InvalidPrivateKey(String),
    #[error("token exchange request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("token exchange returned {status}: {body}")]
    ExchangeFailed { status: u16, body: String },
    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ErrorKindExt for CredentialError {
    fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::InvalidInstallationId(_) => ErrorKind::Validation,
            CredentialError::JwtSigning(_) | CredentialError::InvalidPrivateKey(_) => ErrorKind::Validation,
            CredentialError::RequestFailed(_) => ErrorKind::TransientUpstream,
            CredentialError::ExchangeFailed { status, .. } if *status == 401 || *status == 403 => {
                ErrorKind::Auth
            }
            CredentialError::ExchangeFailed { .. } => ErrorKind::TransientUpstream,
            CredentialError::RateLimited { .. } => ErrorKind::RateLimited,
            CredentialError::Unauthorized(_) => ErrorKind::Auth,
        }
    }
}
