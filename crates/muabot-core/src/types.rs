// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the muabot workspace.
//!
//! Rows are keyed by SQLite integer ids; timestamps are RFC3339 strings as
//! written by `chrono::Utc::now().to_rfc3339()`. The storage crate re-exports
//! these types for use in query modules.

use serde::{Deserialize, Serialize};

/// Page-Scoped User ID: the per-Page opaque identifier Messenger assigns to
/// an end user. Newtyped to keep it from being confused with page ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Psid(pub String);

impl std::fmt::Display for Psid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Psid {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Connection status of a Facebook Page account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Created but never verified against the Graph API.
    Draft,
    /// Last connection test succeeded.
    Connected,
    /// Last connection test failed.
    Error,
}

/// A connected Facebook Page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub tenant_id: i64,
    /// Stable numeric page identifier as a string.
    pub page_id: String,
    pub name: String,
    /// Long-lived page access token. Read per send so rotations take effect
    /// at the next outbound call.
    pub access_token: String,
    /// Only "facebook" is in scope.
    pub platform: String,
    pub status: AccountStatus,
    pub active: bool,
    pub created_at: String,
}

/// Chatbot state of a conversation. Stored as the snake_case string form.
///
/// Transitions are driven exclusively by the state machine; adding a variant
/// is a compile-time obligation on every dispatch site.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    AskName,
    AskPhone,
    ShowProducts,
    ConfirmOrder,
    Completed,
}

/// One Messenger conversation per (account, PSID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub account_id: i64,
    pub tenant_id: i64,
    pub psid: Psid,
    pub state: ConversationState,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    /// Desired quantity. Always 1 in the current flow.
    pub quantity: i64,
    /// End of the post-order cooldown window, RFC3339. `None` when no
    /// cooldown is active.
    pub cooldown_until: Option<String>,
    /// Backreference to the order this conversation produced, if any.
    /// Nullable: the order outlives the conversation.
    pub order_id: Option<i64>,
    /// Backreference to the matched or created partner, if any.
    pub partner_id: Option<i64>,
    pub created_at: String,
    pub last_message_at: Option<String>,
}

impl Conversation {
    /// Whether the post-order cooldown window is still running.
    ///
    /// An unparseable stored timestamp is treated as no cooldown.
    pub fn cooldown_active(&self) -> bool {
        self.cooldown_until.as_deref().is_some_and(|ts| {
            chrono::DateTime::parse_from_rfc3339(ts)
                .is_ok_and(|t| t > chrono::Utc::now())
        })
    }
}

/// An underlying catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Whole VND. Zero means "price on request".
    pub list_price: i64,
    pub created_at: String,
}

/// A catalog product surfaced through Messenger.
///
/// Read model: joined with the product so callers have the display name and
/// price without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub tenant_id: i64,
    pub product_id: i64,
    /// Display ordering key; ties break on id.
    pub sequence: i64,
    /// Short quick-reply caption, at most 20 characters.
    pub caption: Option<String>,
    pub active: bool,
    pub product_name: String,
    /// Whole VND, captured onto order lines at order time.
    pub list_price: i64,
}

/// Messenger caps quick-reply titles at 20 characters.
pub const QUICK_REPLY_TITLE_MAX: usize = 20;

impl Offer {
    /// Quick-reply button title: the curated caption, or the product name
    /// truncated to 20 characters. Truncation counts characters, not bytes;
    /// product names are routinely Vietnamese.
    pub fn quick_reply_title(&self) -> String {
        match &self.caption {
            Some(c) if !c.is_empty() => c.clone(),
            _ => self
                .product_name
                .chars()
                .take(QUICK_REPLY_TITLE_MAX)
                .collect(),
        }
    }
}

/// A customer record. Phone numbers are stored normalized and resolve to at
/// most one active partner per tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// PSID backreference when the partner was created from Messenger.
    pub psid: Option<String>,
    pub note: Option<String>,
    pub active: bool,
    pub created_at: String,
}

/// A sales order header. Created atomically with its lines, then immutable
/// from this engine's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub tenant_id: i64,
    /// Human order code, e.g. "FBM00042".
    pub name: String,
    pub partner_id: i64,
    /// Origin tag, "Facebook Messenger - <PSID>".
    pub origin: String,
    pub ordered_at: String,
    pub salesperson_id: Option<i64>,
    /// Whole VND. Equals the sum of line quantity x unit price.
    pub total: i64,
    pub note: Option<String>,
    pub created_at: String,
}

/// A single order line. Unit price is captured at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    /// Nullable: the product may be deleted later; the description snapshot
    /// keeps the line readable.
    pub product_id: Option<i64>,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
}

/// An inbound Messenger message as persisted for replay suppression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: i64,
    pub conversation_id: i64,
    /// Facebook message id. `None` disables dedup for this row.
    pub mid: Option<String>,
    pub body: Option<String>,
    pub payload: Option<String>,
    pub received_at: String,
}

/// A quick-reply button as handed to the outbound messenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub title: String,
    pub payload: String,
}
