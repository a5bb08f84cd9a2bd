// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation dispatcher and sales state machine.
//!
//! The entry point is [`Dispatcher::handle`]: one normalized messaging event
//! in, zero or more Messenger replies out, with all conversation state in
//! SQLite. The six-state flow (`idle` through `completed`) lives in
//! [`flow::StateMachine`]; everything user-visible is Vietnamese copy from
//! [`replies`].

pub mod catalog;
pub mod dispatcher;
pub mod flow;
pub mod locks;
pub mod normalize;
pub mod outbound;
pub mod replies;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Dispatcher, IncomingMessage};
pub use flow::StateMachine;
pub use outbound::Outbound;
