// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the muabot Messenger commerce engine.
//!
//! This crate provides the shared error type, domain model types, and the
//! outbound-delivery trait used throughout the muabot workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MuabotError;
pub use traits::MessageSender;
pub use types::{
    Account, AccountStatus, Conversation, ConversationState, InboundMessage, Offer, Order,
    OrderLine, Partner, Product, Psid, QuickReply, QUICK_REPLY_TITLE_MAX,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = MuabotError::Config("test".into());
        let _storage = MuabotError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _graph = MuabotError::Graph {
            message: "test".into(),
            source: None,
        };
        let _gateway = MuabotError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _internal = MuabotError::Internal("test".into());
    }

    #[test]
    fn conversation_state_serializes_as_snake_case() {
        let json = serde_json::to_string(&ConversationState::ShowProducts).unwrap();
        assert_eq!(json, "\"show_products\"");
        let parsed: ConversationState = serde_json::from_str("\"confirm_order\"").unwrap();
        assert_eq!(parsed, ConversationState::ConfirmOrder);
    }

    #[test]
    fn psid_displays_raw_id() {
        let psid = Psid("1234567890".into());
        assert_eq!(psid.to_string(), "1234567890");
        assert_eq!(psid.as_str(), "1234567890");
    }
}
