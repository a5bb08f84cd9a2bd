// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order placement for the Muabot commerce engine.
//!
//! Turns a confirmed conversation into a committed sales order: partner
//! resolution, order header and lines, and the conversation's transition to
//! `completed`, all in one SQLite transaction.

pub mod error;
pub mod service;

pub use error::{OrderError, ValidationFailure};
pub use service::{place_order, PlacedOrder};
