// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! codeagent-router: parses webhook payloads into [`codeagent_core::RouterContext`]
//! and dispatches them to the first accepting [`ModeHandler`].

pub mod error;
mod handler;
mod payload;

pub use error::RouterError;
pub use handler::{EventRouter, ModeHandler};
pub use payload::parse;
