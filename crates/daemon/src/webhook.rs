// SPDX-License-Identifier: Apache-2.0

//! The inbound HTTP front door. `axum` is the ecosystem-standard choice for
//! this. Signature verification is out of scope here — see
//! [`WebhookVerifier`].

use crate::wiring::App;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use codeagent_core::TaskContext;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

/// The platform's webhook signature scheme (HMAC-SHA256 over the raw body)
/// is a named non-goal; this seam exists so a real verifier can be dropped
/// in later without touching the handler. `Noop` accepts everything.
pub enum WebhookVerifier {
    Noop,
}

impl WebhookVerifier {
    fn verify(&self, _headers: &HeaderMap, _body: &[u8]) -> bool {
        match self {
            WebhookVerifier::Noop => true,
        }
    }
}

pub struct WebhookState {
    pub app: Arc<App>,
    pub verifier: WebhookVerifier,
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new().route("/webhook", post(handle_webhook)).route("/healthz", get(handle_healthz)).with_state(state)
}

async fn handle_webhook(State(state): State<Arc<WebhookState>>, headers: HeaderMap, body: axum::body::Bytes) -> Response {
    if !state.verifier.verify(&headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let event_type = match headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok()) {
        Some(v) => v.to_string(),
        None => return (StatusCode::BAD_REQUEST, "missing X-GitHub-Event header").into_response(),
    };
    let delivery_id =
        headers.get("X-GitHub-Delivery").and_then(|v| v.to_str().ok()).unwrap_or("unknown").to_string();

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("malformed JSON body: {e}")).into_response(),
    };

    let ctx = match codeagent_router::parse(&event_type, &delivery_id, &raw) {
        Ok(ctx) => ctx,
        Err(codeagent_router::RouterError::Unsupported(kind)) => {
            tracing::debug!(event = kind, delivery_id, "skipping unsupported event type");
            return StatusCode::OK.into_response();
        }
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    if let (Some(bound), Some(incoming)) = (state.app.bound_installation_id, ctx.installation_id) {
        if bound != incoming {
            tracing::warn!(bound, incoming, "rejecting event for an unbound installation id");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let span = tracing::info_span!(
        "webhook_event",
        delivery_id = %ctx.delivery_id,
        repo = %format!("{}/{}", ctx.repo.org, ctx.repo.repo),
        number = ctx.reference.number(),
    );
    let task = TaskContext::new(ctx.delivery_id.clone(), ctx.installation_id, span.clone(), &state.app.shutdown);

    match state.app.router.dispatch(&ctx, &task).instrument(span).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(codeagent_router::RouterError::NoHandler) => {
            tracing::debug!("no handler accepted this event");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Serialize)]
struct Health {
    workspaces: usize,
    live_sessions: usize,
    credential_refreshes: u64,
    credential_refresh_failures: u64,
    last_credential_refresh_secs: u64,
}

/// Reports counts useful for operational monitoring over plain HTTP.
async fn handle_healthz(State(state): State<Arc<WebhookState>>) -> Json<Health> {
    let stats = state.app.credentials.stats();
    Json(Health {
        workspaces: state.app.workspaces.workspace_count(),
        live_sessions: state.app.sessions.session_count().await,
        credential_refreshes: stats.total_refreshes,
        credential_refresh_failures: stats.total_failures,
        last_credential_refresh_secs: stats.last_run_secs,
    })
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
