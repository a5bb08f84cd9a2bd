// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook delivery payload shapes.
//!
//! Every field defaults: Facebook adds fields without notice and sends
//! different event families (delivery receipts, read receipts, postbacks)
//! through the same `messaging[]` array. A payload this crate does not
//! recognize must deserialize anyway and fall out of the pipeline as a
//! drop, never as a parse failure.

use muabot_chatbot::IncomingMessage;
use serde::Deserialize;

/// Top-level webhook delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookDelivery {
    /// "page" for Messenger page subscriptions.
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// One page's batch of events within a delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    /// Page id, also present per event as `recipient.id`.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// One messaging event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Participant,
    #[serde(default)]
    pub recipient: Participant,
    #[serde(default)]
    pub timestamp: i64,
    /// Present for message events; absent for receipts and postbacks.
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: String,
}

/// The message body of a messaging event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventMessage {
    /// Facebook message id, unique per message.
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Loopback of a message the page sent.
    #[serde(default)]
    pub is_echo: bool,
    /// Set when the user tapped a quick-reply button.
    #[serde(default)]
    pub quick_reply: Option<QuickReplyPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuickReplyPayload {
    #[serde(default)]
    pub payload: String,
}

/// Flatten a messaging event into the dispatcher's input shape.
///
/// Returns `None` for events without a `message` body (receipts,
/// postbacks); the dispatcher never sees those.
pub fn to_incoming(event: &MessagingEvent) -> Option<IncomingMessage> {
    let message = event.message.as_ref()?;
    Some(IncomingMessage {
        page_id: event.recipient.id.clone(),
        psid: event.sender.id.clone(),
        mid: message.mid.clone(),
        text: message.text.clone(),
        quick_reply_payload: message.quick_reply.as_ref().map(|q| q.payload.clone()),
        is_echo: message.is_echo,
    })
}
