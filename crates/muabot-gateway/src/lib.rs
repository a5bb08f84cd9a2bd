// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Messenger webhook gateway.
//!
//! Terminates the two webhook endpoints (verification handshake and event
//! delivery), authenticates deliveries, and feeds messaging events to the
//! conversation dispatcher one at a time, in array order.

pub mod events;
pub mod server;
pub mod signature;
pub mod webhook;

pub use server::{install_signal_handler, router, serve};
pub use webhook::AppState;
