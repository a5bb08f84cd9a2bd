// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessageSender`] implementation backed by the Graph client.
//!
//! The token comes from the account row on every call, so a rotated page
//! token takes effect at the next send without a restart.

use async_trait::async_trait;
use muabot_core::{Account, MessageSender, MuabotError, Psid, QuickReply};

use crate::client::GraphClient;
use crate::types::SendMessageRequest;

#[async_trait]
impl MessageSender for GraphClient {
    async fn send_text(
        &self,
        account: &Account,
        psid: &Psid,
        text: &str,
    ) -> Result<(), MuabotError> {
        let request = SendMessageRequest::text(psid, text);
        self.send_message(&account.access_token, &request).await
    }

    async fn send_quick_replies(
        &self,
        account: &Account,
        psid: &Psid,
        text: &str,
        replies: &[QuickReply],
    ) -> Result<(), MuabotError> {
        let request = SendMessageRequest::with_quick_replies(psid, text, replies);
        self.send_message(&account.access_token, &request).await
    }
}
