// SPDX-License-Identifier: Apache-2.0

use codeagent_core::Assistant;
use std::time::Duration;

/// `codeProvider` and `cleanupAfter` environment inputs, plus the
/// retry width every handler shares when calling `promptWithRetry`.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Default assistant when none can be deduced from the branch name.
    pub default_assistant: Assistant,
    /// Passed through to `SessionManager::prompt_with_retry`.
    pub max_prompt_attempts: usize,
    /// Threshold `Cleanup` compares workspace age against.
    pub cleanup_after: Duration,
    /// Prefix prepended to `{org}/{repo}` to build a clone URL. Production
    /// wiring sets this to the platform's host; tests point it at a local
    /// directory standing in for the remote.
    pub remote_base: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            default_assistant: Assistant::Claude,
            max_prompt_attempts: 3,
            cleanup_after: Duration::from_secs(24 * 3600),
            remote_base: "https://github.com".to_string(),
        }
    }
}
