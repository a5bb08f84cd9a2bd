// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The outbound delivery seam.
//!
//! The state machine never talks to the Graph API directly; it goes through
//! [`MessageSender`] so tests can substitute a recording mock.

use async_trait::async_trait;

use crate::error::MuabotError;
use crate::types::{Account, Psid, QuickReply};

/// Delivers messages to a Messenger user on behalf of a page.
///
/// Implementations take the access token from the `Account` row on every
/// call; rotated tokens apply at the next send.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends a plain text message. Success means the platform accepted the
    /// send (HTTP 2xx).
    async fn send_text(
        &self,
        account: &Account,
        psid: &Psid,
        text: &str,
    ) -> Result<(), MuabotError>;

    /// Sends a text message carrying quick-reply buttons. Callers are
    /// responsible for capping the list at the platform limit of 11.
    async fn send_quick_replies(
        &self,
        account: &Account,
        psid: &Psid,
        text: &str,
        replies: &[QuickReply],
    ) -> Result<(), MuabotError>;
}
