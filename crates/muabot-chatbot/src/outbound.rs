// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound Messenger wrapper.
//!
//! Send failures are logged and swallowed: the reply is lost but the
//! conversation state stands, and the user can always repeat their message.
//! Nothing in the state machine rolls back because Facebook dropped a send.

use std::sync::Arc;

use muabot_core::{Account, MessageSender, Psid, QuickReply};
use tracing::warn;

use crate::catalog::QUICK_REPLY_LIMIT;

/// Fire-and-forget send surface for state handlers.
#[derive(Clone)]
pub struct Outbound {
    sender: Arc<dyn MessageSender>,
}

impl Outbound {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Send a plain text reply. Failure is logged, never surfaced.
    pub async fn text(&self, account: &Account, psid: &Psid, text: &str) {
        if let Err(err) = self.sender.send_text(account, psid, text).await {
            warn!(%psid, %err, "outbound text send failed, reply lost");
        }
    }

    /// Send a text reply with quick-reply buttons, capped at the platform
    /// limit of 11. Failure is logged, never surfaced.
    pub async fn quick_replies(
        &self,
        account: &Account,
        psid: &Psid,
        text: &str,
        replies: &[QuickReply],
    ) {
        let capped = if replies.len() > QUICK_REPLY_LIMIT {
            warn!(
                %psid,
                count = replies.len(),
                "quick reply list over platform limit, truncating"
            );
            &replies[..QUICK_REPLY_LIMIT]
        } else {
            replies
        };
        if let Err(err) = self
            .sender
            .send_quick_replies(account, psid, text, capped)
            .await
        {
            warn!(%psid, %err, "outbound quick reply send failed, reply lost");
        }
    }
}
