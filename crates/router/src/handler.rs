// SPDX-License-Identifier: Apache-2.0

//! The `{accepts, execute, priority, name}` capability set every
//! ModeHandler shares, and the [`EventRouter`] that dispatches to the first
//! acceptor.

use crate::error::RouterError;
use async_trait::async_trait;
use codeagent_core::{RouterContext, TaskContext};
use std::sync::Arc;

/// A strategy for turning a routed event into work. The router depends only
/// on this shared capability set, never on a handler's concrete type.
#[async_trait]
pub trait ModeHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Handlers are tried in descending priority order; the tag handler is
    /// highest.
    fn priority(&self) -> i32;

    /// Whether this handler claims `ctx`. Must be side-effect free.
    fn accepts(&self, ctx: &RouterContext) -> bool;

    /// Runs the end-to-end flow for `ctx`. Only called after `accepts`
    /// returned `true` for the same context. `task` carries the
    /// cancellation signal and tracing span for this delivery.
    async fn execute(
        &self,
        ctx: &RouterContext,
        task: &TaskContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Holds registered [`ModeHandler`]s as an ordered list and dispatches each
/// routed event to the first one that accepts it.
#[derive(Default)]
pub struct EventRouter {
    handlers: Vec<Arc<dyn ModeHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Registers `handler`, keeping the list sorted by descending priority;
    /// handlers of equal priority keep their registration order.
    pub fn register(&mut self, handler: Arc<dyn ModeHandler>) {
        let pos = self.handlers.partition_point(|h| h.priority() >= handler.priority());
        self.handlers.insert(pos, handler);
    }

    /// Returns the first registered handler that accepts `ctx`, without
    /// running it. Used by tests and by callers that want to decide
    /// cancellation/timeout policy before executing.
    pub fn select(&self, ctx: &RouterContext) -> Option<&Arc<dyn ModeHandler>> {
        self.handlers.iter().find(|h| h.accepts(ctx))
    }

    /// Routes `ctx` to the first acceptor. Returns [`RouterError::NoHandler`]
    /// if none accept.
    pub async fn dispatch(&self, ctx: &RouterContext, task: &TaskContext) -> Result<(), RouterError> {
        let handler = self.select(ctx).ok_or(RouterError::NoHandler)?;
        handler
            .execute(ctx, task)
            .await
            .map_err(|source| RouterError::HandlerFailed { name: handler.name().to_string(), source })
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
