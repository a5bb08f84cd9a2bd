// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-crate test doubles for the dispatcher and flow tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use muabot_core::{Account, AccountStatus, MessageSender, MuabotError, Psid, QuickReply};

/// One captured outbound send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub psid: String,
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

/// A [`MessageSender`] that records sends instead of calling the Graph API.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every send returns a Graph error without recording.
    pub fn fail_next_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of all captured sends, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    fn record(&self, psid: &Psid, text: &str, replies: &[QuickReply]) -> Result<(), MuabotError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MuabotError::Graph {
                message: "mock send refused".into(),
                source: None,
            });
        }
        self.sent.lock().unwrap().push(SentMessage {
            psid: psid.as_str().to_string(),
            text: text.to_string(),
            quick_replies: replies.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(
        &self,
        _account: &Account,
        psid: &Psid,
        text: &str,
    ) -> Result<(), MuabotError> {
        self.record(psid, text, &[])
    }

    async fn send_quick_replies(
        &self,
        _account: &Account,
        psid: &Psid,
        text: &str,
        replies: &[QuickReply],
    ) -> Result<(), MuabotError> {
        self.record(psid, text, replies)
    }
}

/// An account row that never touched the database.
pub fn test_account() -> Account {
    Account {
        id: 1,
        tenant_id: 1,
        page_id: "page-1".to_string(),
        name: "Shop".to_string(),
        access_token: "tok".to_string(),
        platform: "facebook".to_string(),
        status: AccountStatus::Connected,
        active: true,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}
