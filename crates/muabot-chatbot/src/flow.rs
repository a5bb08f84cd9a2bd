// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The six-state sales flow.
//!
//! `idle -> ask_name -> ask_phone -> show_products -> confirm_order ->
//! completed`. Each handler validates input, mutates the conversation, and
//! sends the next prompt. Invalid input re-prompts without advancing. State
//! is written before the reply goes out, so a lost send never leaves the
//! conversation behind its own prompt.

use muabot_config::model::ChatbotConfig;
use muabot_core::{Account, Conversation, ConversationState, MuabotError};
use muabot_orders::{place_order, OrderError};
use muabot_storage::queries::{conversations, offers};
use muabot_storage::Database;
use tracing::{debug, warn};

use crate::catalog;
use crate::normalize::{self, CANCEL_TOKENS, CONFIRM_TOKENS, TRIGGER_TOKENS};
use crate::outbound::Outbound;
use crate::replies;

/// Runs conversation inputs through the state handlers.
#[derive(Clone)]
pub struct StateMachine {
    db: Database,
    outbound: Outbound,
    config: ChatbotConfig,
}

impl StateMachine {
    pub fn new(db: Database, outbound: Outbound, config: ChatbotConfig) -> Self {
        Self {
            db,
            outbound,
            config,
        }
    }

    /// Dispatch one input to the handler for the conversation's state.
    ///
    /// The caller holds the per-conversation lock and passes a freshly
    /// loaded `Conversation`.
    pub async fn run(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        match conversation.state {
            ConversationState::Idle => self.handle_idle(account, conversation, input).await,
            ConversationState::AskName => self.handle_ask_name(account, conversation, input).await,
            ConversationState::AskPhone => {
                self.handle_ask_phone(account, conversation, input).await
            }
            ConversationState::ShowProducts => {
                self.handle_show_products(account, conversation, input).await
            }
            ConversationState::ConfirmOrder => {
                self.handle_confirm_order(account, conversation, input).await
            }
            ConversationState::Completed => {
                self.handle_completed(account, conversation, input).await
            }
        }
    }

    async fn handle_idle(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        if normalize::matches_any(input, TRIGGER_TOKENS) {
            conversations::set_state(&self.db, conversation.id, ConversationState::AskName).await?;
            self.outbound
                .text(account, &conversation.psid, replies::greeting_ask_name())
                .await;
        } else {
            self.outbound
                .text(account, &conversation.psid, replies::idle_hint())
                .await;
        }
        Ok(())
    }

    async fn handle_ask_name(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        let Some(name) = normalize::normalize_name(input) else {
            self.outbound
                .text(account, &conversation.psid, replies::name_too_short())
                .await;
            return Ok(());
        };

        conversations::set_customer_name(&self.db, conversation.id, &name).await?;
        conversations::set_state(&self.db, conversation.id, ConversationState::AskPhone).await?;
        self.outbound
            .text(account, &conversation.psid, &replies::ask_phone(&name))
            .await;
        Ok(())
    }

    async fn handle_ask_phone(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        let Some(phone) = normalize::normalize_phone(input) else {
            self.outbound
                .text(account, &conversation.psid, replies::phone_invalid())
                .await;
            return Ok(());
        };

        conversations::set_customer_phone(&self.db, conversation.id, &phone).await?;
        conversations::set_state(&self.db, conversation.id, ConversationState::ShowProducts)
            .await?;
        self.send_product_list(account, conversation).await
    }

    async fn handle_show_products(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        let Some(offer_id) = normalize::parse_product_payload(input) else {
            // Free text while the buttons are showing; the user is expected
            // to tap one.
            debug!(conversation_id = conversation.id, "ignoring free text in show_products");
            return Ok(());
        };

        let Some(offer) = offers::find_active(&self.db, conversation.tenant_id, offer_id).await?
        else {
            self.outbound
                .text(account, &conversation.psid, replies::product_not_found())
                .await;
            return Ok(());
        };

        // The selection is a singleton; a new tap replaces the old pick.
        conversations::clear_selected_offers(&self.db, conversation.id).await?;
        conversations::add_selected_offer(&self.db, conversation.id, offer.id).await?;
        conversations::set_state(&self.db, conversation.id, ConversationState::ConfirmOrder)
            .await?;

        let customer_name = conversation.customer_name.as_deref().unwrap_or("");
        let customer_phone = conversation.customer_phone.as_deref().unwrap_or("");
        let card = replies::confirmation_card(
            &offer.product_name,
            offer.list_price,
            conversation.quantity,
            customer_name,
            customer_phone,
        );
        self.outbound.text(account, &conversation.psid, &card).await;
        Ok(())
    }

    async fn handle_confirm_order(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        if normalize::matches_any(input, CONFIRM_TOKENS) {
            return self.confirm(account, conversation).await;
        }

        if normalize::matches_any(input, CANCEL_TOKENS) {
            conversations::clear_selected_offers(&self.db, conversation.id).await?;
            conversations::set_state(&self.db, conversation.id, ConversationState::ShowProducts)
                .await?;
            return self.send_product_list(account, conversation).await;
        }

        self.outbound
            .text(account, &conversation.psid, replies::confirm_reprompt())
            .await;
        Ok(())
    }

    async fn confirm(
        &self,
        account: &Account,
        conversation: &Conversation,
    ) -> Result<(), MuabotError> {
        match place_order(&self.db, &self.config, conversation.id).await {
            Ok(placed) => {
                let customer_name = conversation.customer_name.as_deref().unwrap_or("");
                let customer_phone = conversation.customer_phone.as_deref().unwrap_or("");
                let envelope = replies::order_success(
                    &placed.order.name,
                    placed.order.total,
                    customer_name,
                    customer_phone,
                );
                // Post-commit send; a failure here is logged inside Outbound
                // and must not undo the order.
                self.outbound
                    .text(account, &conversation.psid, &envelope)
                    .await;
                Ok(())
            }
            Err(OrderError::Validation(failure)) => {
                self.outbound
                    .text(account, &conversation.psid, replies::validation_error(&failure))
                    .await;
                Ok(())
            }
            Err(OrderError::NotAwaitingConfirmation) => {
                // Replayed confirmation; the first delivery already placed
                // the order.
                debug!(
                    conversation_id = conversation.id,
                    "confirmation arrived for a conversation no longer awaiting it"
                );
                Ok(())
            }
            Err(OrderError::Storage(err)) => {
                warn!(
                    conversation_id = conversation.id,
                    %err,
                    "order placement failed, resetting conversation"
                );
                conversations::reset_to_idle(&self.db, conversation.id).await?;
                self.outbound
                    .text(account, &conversation.psid, replies::generic_retry())
                    .await;
                Ok(())
            }
        }
    }

    async fn handle_completed(
        &self,
        account: &Account,
        conversation: &Conversation,
        input: &str,
    ) -> Result<(), MuabotError> {
        if conversation.cooldown_active() {
            self.outbound
                .text(account, &conversation.psid, replies::cooldown_ack())
                .await;
            return Ok(());
        }

        // Cooldown expired: back to the start, then the same input runs
        // through the idle handler.
        conversations::reset_to_idle(&self.db, conversation.id).await?;
        self.handle_idle(account, conversation, input).await
    }

    async fn send_product_list(
        &self,
        account: &Account,
        conversation: &Conversation,
    ) -> Result<(), MuabotError> {
        let offers = offers::active_offers(&self.db, conversation.tenant_id).await?;
        if offers.is_empty() {
            self.outbound
                .text(account, &conversation.psid, replies::no_products())
                .await;
            return Ok(());
        }

        let text = catalog::list_text(&offers);
        let buttons = catalog::quick_replies(&offers);
        self.outbound
            .quick_replies(account, &conversation.psid, &text, &buttons)
            .await;
        Ok(())
    }
}
