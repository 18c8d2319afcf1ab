// SPDX-License-Identifier: Apache-2.0

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-core: pure domain types shared by every stage of the task
//! execution pipeline — directory naming, Workspace/Session/InstallationToken
//! records, the RouterContext envelope, ID generation, the testable clock,
//! and the error-kind taxonomy. Nothing in this crate performs I/O.

pub mod clock;
pub mod credential;
pub mod error;
pub mod id;
pub mod naming;
pub mod router;
pub mod session;
pub mod task;
pub mod workspace;

pub use clock::{Clock, FakeClock, SystemClock};
pub use credential::{now_secs, InstallationToken, EXPIRY_SKEW};
pub use error::{ErrorKind, ErrorKindExt};
pub use router::{Actor, CommentRef, EventClass, IssueOrPrNumber, RouterContext, TriggerCommand};
pub use session::{indicates_dead_process, SessionStatus};
pub use task::TaskContext;
pub use workspace::{Assistant, RepoCoord, Workspace, WorkspaceKey, WorkspaceKind};
