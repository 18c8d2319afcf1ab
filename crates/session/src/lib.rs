// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-session: owns the assistant subprocess lifecycle and the
//! shared retry-with-recreation policy.

pub mod error;
pub mod manager;
pub mod process;

pub use error::SessionError;
pub use manager::SessionManager;
pub use process::{ChildSessionProcess, CommandSpawner, SessionProcess, SessionSpawner};
