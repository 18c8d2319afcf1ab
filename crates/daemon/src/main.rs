// SPDX-License-Identifier: Apache-2.0

//! codeagentd entrypoint: loads configuration, wires the crates together,
//! starts the background loops, and serves the webhook front door.
//!
//! `anyhow` is used only at this outermost boundary; every library crate
//! below propagates its own `thiserror` leaf error.

use anyhow::Context;
use codeagentd::webhook::{router, WebhookState, WebhookVerifier};
use codeagentd::{App, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("CODEAGENT_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;

    let app = Arc::new(App::build(&config).context("failed to wire application components")?);
    app.recover().await;
    let (_refresh_handle, _sweep_handle) = app.spawn_background_loops();

    let shutdown = app.shutdown.clone();
    let state = Arc::new(WebhookState { app, verifier: WebhookVerifier::Noop });
    let listener = tokio::net::TcpListener::bind(config.webhook_bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.webhook_bind))?;
    tracing::info!(addr = %config.webhook_bind, "codeagentd listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("failed to install ctrl_c handler, shutdown signal will never fire");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown signal received, cancelling in-flight tasks");
            shutdown.cancel();
        })
        .await
        .context("webhook server exited")?;
    Ok(())
}
