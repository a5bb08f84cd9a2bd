// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Graph API integration for the Muabot commerce engine.
//!
//! Covers the Send API (text and quick replies), page metadata reads,
//! leadgen retrieval, and page publishing. [`GraphClient`] implements
//! `muabot_core::MessageSender` so the chatbot can be tested against a
//! recording fake instead of HTTP.

pub mod client;
pub mod sender;
pub mod types;

pub use client::GraphClient;
pub use types::{PageInfo, SendMessageRequest};
