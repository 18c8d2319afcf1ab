// SPDX-License-Identifier: Apache-2.0

//! Bootstraps every `codeagent-*` component from a [`Config`] into one
//! [`App`] bundle: one function assembling every crate's concrete type
//! from a [`Config`] and handing back a single struct the front door holds.

use crate::config::{AuthConfig, Config};
use crate::error::DaemonError;
use async_trait::async_trait;
use codeagent_credentials::{AppIdentity, AuthMode, CredentialManager, ExchangeScope, RefreshConfig};
use codeagent_handlers::{AgentHandler, CleanupOrchestrator, HandlerConfig, ReviewHandler, TagHandler};
use codeagent_platform::{GithubClient, PlatformClient, PlatformError, TokenSource};
use codeagent_router::EventRouter;
use codeagent_session::{CommandSpawner, SessionManager};
use codeagent_workspace::{NoopContainerCleanup, RepoCache, WorkspaceManager};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Picks the assistant CLI invocation for a workspace. The actual assistant
/// wire protocol is out of scope here; this only has to produce *some*
/// command the configured CLIs understand.
fn command_for(assistant: &str) -> String {
    format!("{assistant} --print --dangerously-skip-permissions")
}

/// Bridges `CredentialManager::token_for` to the single-method
/// `platform::TokenSource` seam `GithubClient` depends on.
///
/// `GithubClient` is constructed once at startup and has no per-request
/// notion of "which installation is this event for"; the daemon only
/// supports a single bound installation per process (or a personal token),
/// matching the rule that events carrying an installation id that
/// mismatches the client's binding are rejected. Multi-installation
/// fan-out would need a `PlatformClient` constructed per request instead of
/// once at wiring time.
struct CredentialTokenSource {
    credentials: Arc<CredentialManager>,
    installation_id: Option<i64>,
}

#[async_trait]
impl TokenSource for CredentialTokenSource {
    async fn token(&self) -> Result<String, PlatformError> {
        self.credentials
            .token_for(self.installation_id, &ExchangeScope::default())
            .await
            .map_err(|e| PlatformError::Unauthorized(e.to_string()))
    }
}

/// Everything the webhook front door needs to route and execute an event.
pub struct App {
    pub router: EventRouter,
    pub workspaces: Arc<WorkspaceManager>,
    pub sessions: Arc<SessionManager<CommandSpawner>>,
    pub credentials: Arc<CredentialManager>,
    pub cleanup: Arc<CleanupOrchestrator<CommandSpawner>>,
    /// `None` in personal-token mode; `Some` fixes the one installation id
    /// this process serves, per [`CredentialTokenSource`]'s contract.
    pub bound_installation_id: Option<i64>,
    /// Parent of every request's [`codeagent_core::TaskContext`] cancellation
    /// token. Cancelling this cancels every in-flight request's child token;
    /// nothing else ever cancels it directly except process shutdown.
    pub shutdown: CancellationToken,
}

impl App {
    pub fn build(config: &Config) -> Result<Self, DaemonError> {
        let auth_mode = match &config.auth {
            AuthConfig::PersonalToken(token) => AuthMode::PersonalToken(token.as_str().into()),
            AuthConfig::AppInstallation { app_id, private_key, .. } => AuthMode::AppInstallation(AppIdentity {
                app_id: *app_id,
                private_key_pem: Arc::new(private_key.load()?),
            }),
        };
        let bound_installation_id = match &config.auth {
            AuthConfig::PersonalToken(_) => None,
            AuthConfig::AppInstallation { installation_id, .. } => Some(*installation_id),
        };

        let credentials = Arc::new(CredentialManager::with_config(
            auth_mode,
            RefreshConfig {
                interval: config.refresh_interval,
                threshold: config.refresh_threshold,
                max_concurrency: config.max_concurrency,
            },
        ));

        let tokens =
            Arc::new(CredentialTokenSource { credentials: credentials.clone(), installation_id: bound_installation_id });
        let platform: Arc<dyn PlatformClient> = Arc::new(GithubClient::new(tokens));

        let cache = RepoCache::new(config.base_dir.clone());
        let workspaces = Arc::new(
            WorkspaceManager::new(config.base_dir.clone(), cache).with_container_cleanup(Arc::new(NoopContainerCleanup)),
        );

        let spawner = CommandSpawner::new(command_for);
        let sessions = Arc::new(SessionManager::new(spawner));

        let handler_config = HandlerConfig {
            default_assistant: config.code_provider,
            max_prompt_attempts: config.max_prompt_attempts,
            cleanup_after: config.cleanup_after,
            remote_base: config.remote_base.clone(),
        };

        let tag = Arc::new(TagHandler::new(platform.clone(), workspaces.clone(), sessions.clone(), handler_config.clone()));
        let agent =
            Arc::new(AgentHandler::new(platform.clone(), workspaces.clone(), sessions.clone(), handler_config.clone()));
        let review =
            Arc::new(ReviewHandler::new(platform.clone(), workspaces.clone(), sessions.clone(), handler_config.clone()));
        let cleanup =
            Arc::new(CleanupOrchestrator::new(workspaces.clone(), sessions.clone(), platform.clone(), handler_config));

        let mut router = EventRouter::new();
        router.register(tag);
        router.register(review);
        router.register(agent);
        router.register(cleanup.clone());

        Ok(Self {
            router,
            workspaces,
            sessions,
            credentials,
            cleanup,
            bound_installation_id,
            shutdown: CancellationToken::new(),
        })
    }

    /// Recovers workspaces left behind by a previous process, logging and
    /// continuing past a failed scan rather than refusing to start.
    pub async fn recover(&self) {
        match self.workspaces.recover().await {
            Ok(n) => tracing::info!(recovered = n, "startup recovery complete"),
            Err(e) => tracing::warn!(error = %e, "startup recovery failed, continuing with an empty registry"),
        }
    }

    /// Spawns the credential-refresh and cleanup-sweep background loops.
    /// Returned handles are not awaited; the caller keeps them alive for
    /// the process lifetime.
    pub fn spawn_background_loops(&self) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
        let refresh = self.credentials.clone().spawn_refresh_loop();
        let sweep = self.cleanup.clone().spawn_loop();
        (refresh, sweep)
    }
}
