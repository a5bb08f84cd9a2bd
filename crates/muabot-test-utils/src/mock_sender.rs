// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message sender for deterministic testing.
//!
//! `MockSender` implements `MessageSender` with captured outbound messages
//! for assertion in tests, plus a failure switch to exercise the
//! reply-is-best-effort paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use muabot_core::{Account, MessageSender, MuabotError, Psid, QuickReply};

/// One captured outbound message.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub psid: String,
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

/// A mock Messenger sender for testing.
///
/// Messages passed to `send_text()` and `send_quick_replies()` are captured
/// and retrievable via `sent_messages()`. When the failure switch is on,
/// every send returns an error without capturing anything, the way a Graph
/// API outage looks to callers.
pub struct MockSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail: AtomicBool,
}

impl MockSender {
    /// Create a new mock sender with an empty capture queue.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every following send fail (or succeed again when `false`).
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Get all messages that were sent.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// The text bodies of all sent messages, in send order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }

    /// The last message sent, if any.
    pub async fn last_message(&self) -> Option<SentMessage> {
        self.sent.lock().await.last().cloned()
    }

    /// Clear all captured messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    async fn capture(
        &self,
        psid: &Psid,
        text: &str,
        quick_replies: &[QuickReply],
    ) -> Result<(), MuabotError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MuabotError::Graph {
                message: "mock send refused".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push(SentMessage {
            psid: psid.as_str().to_string(),
            text: text.to_string(),
            quick_replies: quick_replies.to_vec(),
        });
        Ok(())
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_text(
        &self,
        _account: &Account,
        psid: &Psid,
        text: &str,
    ) -> Result<(), MuabotError> {
        self.capture(psid, text, &[]).await
    }

    async fn send_quick_replies(
        &self,
        _account: &Account,
        psid: &Psid,
        text: &str,
        replies: &[QuickReply],
    ) -> Result<(), MuabotError> {
        self.capture(psid, text, replies).await
    }
}
