// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `muabot-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use muabot_core::types::{
    Account, AccountStatus, Conversation, ConversationState, InboundMessage, Offer, Order,
    OrderLine, Partner, Product, Psid,
};
