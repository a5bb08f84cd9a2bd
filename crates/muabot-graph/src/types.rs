// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Facebook Graph API.

use muabot_core::{Psid, QuickReply};
use serde::{Deserialize, Serialize};

/// A Send API request body.
///
/// `messaging_type` is always `RESPONSE`: every outbound message here
/// answers a user message inside the standard messaging window.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub recipient: Recipient,
    pub message: MessageBody,
    pub messaging_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReplyButton>>,
}

/// A quick-reply button in Send API shape. `content_type` is always `text`.
#[derive(Debug, Clone, Serialize)]
pub struct QuickReplyButton {
    pub content_type: &'static str,
    pub title: String,
    pub payload: String,
}

impl From<&QuickReply> for QuickReplyButton {
    fn from(reply: &QuickReply) -> Self {
        Self {
            content_type: "text",
            title: reply.title.clone(),
            payload: reply.payload.clone(),
        }
    }
}

impl SendMessageRequest {
    /// A plain text message.
    pub fn text(psid: &Psid, text: &str) -> Self {
        Self {
            recipient: Recipient {
                id: psid.as_str().to_string(),
            },
            message: MessageBody {
                text: text.to_string(),
                quick_replies: None,
            },
            messaging_type: "RESPONSE",
        }
    }

    /// A text message with an attached quick-reply row.
    pub fn with_quick_replies(psid: &Psid, text: &str, replies: &[QuickReply]) -> Self {
        Self {
            recipient: Recipient {
                id: psid.as_str().to_string(),
            },
            message: MessageBody {
                text: text.to_string(),
                quick_replies: Some(replies.iter().map(QuickReplyButton::from).collect()),
            },
            messaging_type: "RESPONSE",
        }
    }
}

/// Graph API error envelope, `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub code: i64,
}

/// Page metadata returned by `GET /{page_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub fan_count: Option<i64>,
    pub link: Option<String>,
    pub picture: Option<PagePicture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagePicture {
    pub data: PagePictureData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagePictureData {
    pub url: String,
}

/// A lead form submission returned by `GET /{leadgen_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadgenData {
    pub id: String,
    pub created_time: String,
    #[serde(default)]
    pub field_data: Vec<LeadField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadField {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Response to publish calls, `{"id": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse {
    pub id: String,
}
