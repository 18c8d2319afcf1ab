// SPDX-License-Identifier: Apache-2.0

//! Assembles the daemon's [`Config`] from an optional TOML file plus
//! `CODEAGENT_*` environment variable overrides — the file supplies
//! defaults, and a set env var always wins over whatever the file says.

use crate::error::DaemonError;
use codeagent_core::Assistant;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "CODEAGENT_";

/// Where the GitHub App's private key comes from. Exactly one of these is
/// populated when [`AuthConfig`] is `AppInstallation`.
#[derive(Debug, Clone)]
pub enum PrivateKeySource {
    Path(PathBuf),
    Inline(String),
}

impl PrivateKeySource {
    pub fn load(&self) -> Result<Vec<u8>, DaemonError> {
        match self {
            PrivateKeySource::Path(path) => std::fs::read(path)
                .map_err(|source| DaemonError::ReadPrivateKey { path: path.display().to_string(), source }),
            PrivateKeySource::Inline(pem) => Ok(pem.clone().into_bytes()),
        }
    }
}

/// Personal-token and app-installation are alternates, same as
/// `codeagent_credentials::AuthMode`; this is the config-file-shaped
/// precursor to it.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    PersonalToken(String),
    AppInstallation { app_id: i64, private_key: PrivateKeySource, installation_id: i64 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub cleanup_after: Duration,
    pub code_provider: Assistant,
    pub auth: AuthConfig,
    pub refresh_interval: Duration,
    pub refresh_threshold: Duration,
    pub max_concurrency: usize,
    pub max_prompt_attempts: usize,
    pub remote_base: String,
    pub webhook_bind: String,
    pub webhook_secret: Option<String>,
}

/// The TOML file shape. Every field optional so a caller can run from pure
/// environment variables with no file at all.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_dir: Option<PathBuf>,
    cleanup_after_secs: Option<u64>,
    code_provider: Option<String>,
    personal_token: Option<String>,
    app_id: Option<i64>,
    app_private_key_path: Option<PathBuf>,
    app_private_key: Option<String>,
    installation_id: Option<i64>,
    refresh_interval_secs: Option<u64>,
    refresh_threshold_secs: Option<u64>,
    max_concurrency: Option<usize>,
    max_prompt_attempts: Option<usize>,
    remote_base: Option<String>,
    webhook_bind: Option<String>,
    webhook_secret: Option<String>,
}

impl Config {
    /// Loads `path` as a TOML base (skipped silently if absent — running
    /// from environment variables alone is a supported mode), then applies
    /// `CODEAGENT_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, DaemonError> {
        let file = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|source| DaemonError::ReadConfig { path: path.display().to_string(), source })?;
                toml::from_str(&raw)
                    .map_err(|source| DaemonError::ParseConfig { path: path.display().to_string(), source })?
            }
            _ => FileConfig::default(),
        };
        Self::from_file_and_env(file)
    }

    fn from_file_and_env(file: FileConfig) -> Result<Self, DaemonError> {
        let base_dir = env_path("BASE_DIR").or(file.base_dir).unwrap_or_else(default_base_dir);

        let cleanup_after = env_u64("CLEANUP_AFTER_SECS", "CODEAGENT_CLEANUP_AFTER_SECS")?
            .or(file.cleanup_after_secs)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(24 * 3600));

        let code_provider = match env_string("CODE_PROVIDER").or(file.code_provider) {
            Some(raw) => Assistant::parse(&raw)
                .ok_or_else(|| DaemonError::InvalidEnv { name: "CODEAGENT_CODE_PROVIDER", value: raw })?,
            None => Assistant::Claude,
        };

        let auth = resolve_auth(&file)?;

        let refresh_interval = env_u64("REFRESH_INTERVAL_SECS", "CODEAGENT_REFRESH_INTERVAL_SECS")?
            .or(file.refresh_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(codeagent_credentials::DEFAULT_REFRESH_INTERVAL);
        let refresh_threshold = env_u64("REFRESH_THRESHOLD_SECS", "CODEAGENT_REFRESH_THRESHOLD_SECS")?
            .or(file.refresh_threshold_secs)
            .map(Duration::from_secs)
            .unwrap_or(codeagent_credentials::DEFAULT_REFRESH_THRESHOLD);
        let max_concurrency = env_usize("MAX_CONCURRENCY", "CODEAGENT_MAX_CONCURRENCY")?
            .or(file.max_concurrency)
            .unwrap_or(codeagent_credentials::DEFAULT_MAX_CONCURRENCY);
        let max_prompt_attempts =
            env_usize("MAX_PROMPT_ATTEMPTS", "CODEAGENT_MAX_PROMPT_ATTEMPTS")?.or(file.max_prompt_attempts).unwrap_or(3);

        let remote_base =
            env_string("REMOTE_BASE").or(file.remote_base).unwrap_or_else(|| "https://github.com".to_string());
        let webhook_bind =
            env_string("WEBHOOK_BIND").or(file.webhook_bind).unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let webhook_secret = env_string("WEBHOOK_SECRET").or(file.webhook_secret);

        Ok(Self {
            base_dir,
            cleanup_after,
            code_provider,
            auth,
            refresh_interval,
            refresh_threshold,
            max_concurrency,
            max_prompt_attempts,
            remote_base,
            webhook_bind,
            webhook_secret,
        })
    }
}

fn resolve_auth(file: &FileConfig) -> Result<AuthConfig, DaemonError> {
    if let Some(token) = env_string("PERSONAL_TOKEN").or_else(|| file.personal_token.clone()) {
        return Ok(AuthConfig::PersonalToken(token));
    }

    let app_id = env_u64("APP_ID", "CODEAGENT_APP_ID")?.map(|v| v as i64).or(file.app_id);
    let installation_id =
        env_u64("INSTALLATION_ID", "CODEAGENT_INSTALLATION_ID")?.map(|v| v as i64).or(file.installation_id);
    let key_path = env_path("APP_PRIVATE_KEY_PATH").or_else(|| file.app_private_key_path.clone());
    let key_inline = env_string("APP_PRIVATE_KEY").or_else(|| file.app_private_key.clone());

    let (Some(app_id), Some(installation_id)) = (app_id, installation_id) else {
        return Err(DaemonError::IncompleteAuth("need a personal token, or app_id + installation_id + a private key"));
    };
    let private_key = match (key_path, key_inline) {
        (Some(path), _) => PrivateKeySource::Path(path),
        (None, Some(pem)) => PrivateKeySource::Inline(pem),
        (None, None) => {
            return Err(DaemonError::IncompleteAuth(
                "app_id/installation_id set but no private key (path or inline) was given",
            ))
        }
    };
    Ok(AuthConfig::AppInstallation { app_id, private_key, installation_id })
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("codeagent")
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{suffix}")).ok().filter(|v| !v.is_empty())
}

fn env_string(suffix: &str) -> Option<String> {
    env_var(suffix)
}

fn env_path(suffix: &str) -> Option<PathBuf> {
    env_var(suffix).map(PathBuf::from)
}

fn env_u64(suffix: &str, full_name: &'static str) -> Result<Option<u64>, DaemonError> {
    match env_var(suffix) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| DaemonError::InvalidEnv { name: full_name, value }),
    }
}

fn env_usize(suffix: &str, full_name: &'static str) -> Result<Option<usize>, DaemonError> {
    match env_var(suffix) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| DaemonError::InvalidEnv { name: full_name, value }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
