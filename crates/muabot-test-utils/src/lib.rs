// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Muabot integration tests.
//!
//! Provides a mock sender and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without talking to Facebook.
//!
//! # Components
//!
//! - [`MockSender`] - Mock Messenger sender with message capture and
//!   failure injection
//! - [`ChatHarness`] - Full pipeline (dispatcher, state machine, orders)
//!   over a temp SQLite database with a seeded page and catalog

pub mod harness;
pub mod mock_sender;

pub use harness::ChatHarness;
pub use mock_sender::{MockSender, SentMessage};
