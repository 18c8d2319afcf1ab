// SPDX-License-Identifier: Apache-2.0

use codeagent_core::{ErrorKind, ErrorKindExt};

/// Errors raised while assembling the daemon from its `Config` — everything
/// past this point is a `codeagent-*` crate error propagated as-is.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("failed to read config file {path}: {source}")]
    ReadConfig { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ParseConfig { path: String, source: toml::de::Error },
    #[error("invalid env var {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("auth config incomplete: {0}")]
    IncompleteAuth(&'static str),
    #[error("failed to read private key at {path}: {source}")]
    ReadPrivateKey { path: String, source: std::io::Error },
}

impl ErrorKindExt for DaemonError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
