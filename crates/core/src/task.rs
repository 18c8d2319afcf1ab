// SPDX-License-Identifier: Apache-2.0

//! [`TaskContext`] — the request-scoped bundle threaded alongside a
//! [`RouterContext`](crate::RouterContext) through a handler's `execute`:
//! delivery id, installation id, a tracing span, and a cancellation signal a
//! long-running retry loop can poll between attempts.

use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Execution-scoped context for one routed event. Unlike `RouterContext`
/// (the parsed payload), this carries the control/observability plumbing a
/// handler's flow needs but the payload itself doesn't.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub delivery_id: String,
    pub installation_id: Option<i64>,
    pub span: Span,
    cancellation: CancellationToken,
}

impl TaskContext {
    pub fn new(delivery_id: impl Into<String>, installation_id: Option<i64>, span: Span, parent: &CancellationToken) -> Self {
        Self { delivery_id: delivery_id.into(), installation_id, span, cancellation: parent.child_token() }
    }

    /// Whether cancellation has been requested for this task. Checked
    /// cooperatively by `SessionManager::prompt_with_retry` between attempts.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Default for TaskContext {
    fn default() -> Self {
        Self {
            delivery_id: "unknown".to_string(),
            installation_id: None,
            span: Span::none(),
            cancellation: CancellationToken::new(),
        }
    }
}
