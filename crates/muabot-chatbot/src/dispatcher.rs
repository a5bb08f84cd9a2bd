// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event dispatch pipeline.
//!
//! Takes normalized messaging events from the webhook gateway, resolves the
//! page account and conversation, suppresses echoes and redeliveries, and
//! hands the effective input to the state machine under the conversation's
//! lock. Every drop is deliberate and logged; none of them is an error to
//! the webhook caller.

use muabot_config::model::ChatbotConfig;
use muabot_core::{MessageSender, MuabotError, Psid};
use muabot_storage::queries::{accounts, conversations, inbound};
use muabot_storage::Database;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::flow::StateMachine;
use crate::locks::ConversationLocks;
use crate::outbound::Outbound;
use crate::replies;

/// One messaging event, flattened out of the webhook delivery envelope.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Recipient page id, used to resolve the account.
    pub page_id: String,
    /// Sender PSID.
    pub psid: String,
    /// Facebook message id; drives redelivery suppression when present.
    pub mid: Option<String>,
    pub text: Option<String>,
    /// Tapped quick-reply payload; takes precedence over `text`.
    pub quick_reply_payload: Option<String>,
    /// Loopback of a message the page itself sent.
    pub is_echo: bool,
}

/// Routes messaging events into the sales flow.
pub struct Dispatcher {
    db: Database,
    machine: StateMachine,
    outbound: Outbound,
    config: ChatbotConfig,
    locks: ConversationLocks,
}

impl Dispatcher {
    pub fn new(db: Database, sender: Arc<dyn MessageSender>, config: ChatbotConfig) -> Self {
        let outbound = Outbound::new(sender);
        let machine = StateMachine::new(db.clone(), outbound.clone(), config.clone());
        Self {
            db,
            machine,
            outbound,
            config,
            locks: ConversationLocks::new(),
        }
    }

    /// Process one messaging event end to end.
    ///
    /// Returns `Ok(())` for every deliberate drop (echo, unknown page,
    /// disabled chatbot, duplicate mid, missing input); only storage
    /// failures surface as errors.
    pub async fn handle(&self, event: IncomingMessage) -> Result<(), MuabotError> {
        if event.is_echo {
            debug!(page_id = %event.page_id, "dropping echo event");
            return Ok(());
        }
        if event.page_id.is_empty() || event.psid.is_empty() {
            debug!("dropping event without page id or sender");
            return Ok(());
        }

        let Some(account) = accounts::find_by_page_id(&self.db, &event.page_id).await? else {
            warn!(page_id = %event.page_id, "no active account for page, dropping event");
            return Ok(());
        };

        // The master switch gates everything, including conversation
        // creation: a disabled chatbot leaves no trace.
        if !self.config.enabled {
            debug!(page_id = %event.page_id, "chatbot disabled, dropping event");
            return Ok(());
        }

        let psid = Psid(event.psid.clone());
        let conversation =
            conversations::find_or_create(&self.db, account.id, account.tenant_id, &psid).await?;

        // Quick-reply payload wins over the typed text.
        let payload = event.quick_reply_payload.as_deref();
        let Some(input) = payload.or(event.text.as_deref()) else {
            debug!(
                conversation_id = conversation.id,
                "event carries no text or payload, dropping"
            );
            return Ok(());
        };

        // Everything below mutates the conversation; serialize per
        // conversation and re-read state under the lock.
        let lock = self.locks.for_conversation(conversation.id);
        let _guard = lock.lock().await;

        let Some(conversation) = conversations::get(&self.db, conversation.id).await? else {
            return Ok(());
        };

        let recorded = inbound::record_message(
            &self.db,
            conversation.id,
            event.mid.as_deref(),
            event.text.as_deref(),
            payload,
        )
        .await?;
        if !recorded {
            debug!(
                conversation_id = conversation.id,
                mid = event.mid.as_deref().unwrap_or(""),
                "duplicate delivery, already handled"
            );
            return Ok(());
        }

        conversations::touch_last_message(&self.db, conversation.id).await?;

        if conversation.cooldown_active() {
            self.outbound
                .text(&account, &conversation.psid, replies::cooldown_ack())
                .await;
            return Ok(());
        }

        self.machine.run(&account, &conversation, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSender;
    use muabot_core::ConversationState;
    use muabot_storage::queries::offers;
    use tempfile::tempdir;

    struct DispatchFixture {
        db: Database,
        dispatcher: Dispatcher,
        sender: Arc<RecordingSender>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(enabled: bool) -> DispatchFixture {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dispatch.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        accounts::create_account(&db, 1, "page-1", "Shop", "tok")
            .await
            .unwrap();
        let product = offers::create_product(&db, "Cà phê", 25000).await.unwrap();
        offers::create_offer(&db, 1, product.id, 10, None, true)
            .await
            .unwrap();

        let sender = Arc::new(RecordingSender::new());
        let config = ChatbotConfig {
            enabled,
            cooldown_minutes: 5,
            lead_default_user_id: None,
        };
        let dispatcher = Dispatcher::new(db.clone(), sender.clone(), config);

        DispatchFixture {
            db,
            dispatcher,
            sender,
            _dir: dir,
        }
    }

    fn text_event(mid: &str, text: &str) -> IncomingMessage {
        IncomingMessage {
            page_id: "page-1".into(),
            psid: "77".into(),
            mid: Some(mid.into()),
            text: Some(text.into()),
            quick_reply_payload: None,
            is_echo: false,
        }
    }

    async fn conversation_count(db: &Database) -> i64 {
        conversations::count_conversations(db).await.unwrap()
    }

    #[tokio::test]
    async fn text_event_reaches_state_machine() {
        let fx = fixture(true).await;
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 1);
        let conversation = conversations::get(&fx.db, 1).await.unwrap().unwrap();
        assert_eq!(conversation.state, ConversationState::AskName);
        assert_eq!(fx.sender.texts(), vec![replies::greeting_ask_name()]);
    }

    #[tokio::test]
    async fn echo_events_leave_no_trace() {
        let fx = fixture(true).await;
        let mut event = text_event("m1", "mua");
        event.is_echo = true;

        fx.dispatcher.handle(event).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 0);
        assert!(fx.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_page_is_dropped() {
        let fx = fixture(true).await;
        let mut event = text_event("m1", "mua");
        event.page_id = "page-unknown".into();

        fx.dispatcher.handle(event).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 0);
        assert!(fx.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn disabled_chatbot_changes_nothing() {
        let fx = fixture(false).await;
        for input in ["mua", "Alice", "PRODUCT_1"] {
            fx.dispatcher
                .handle(text_event(&format!("m-{input}"), input))
                .await
                .unwrap();
        }

        assert_eq!(conversation_count(&fx.db).await, 0);
        assert!(fx.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn quick_reply_payload_wins_over_text() {
        let fx = fixture(true).await;
        // Walk to show_products first.
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();
        fx.dispatcher.handle(text_event("m2", "Alice")).await.unwrap();
        fx.dispatcher
            .handle(text_event("m3", "0912345678"))
            .await
            .unwrap();

        let mut event = text_event("m4", "Cà phê");
        event.quick_reply_payload = Some("PRODUCT_1".into());
        fx.dispatcher.handle(event).await.unwrap();

        let conversation = conversations::get(&fx.db, 1).await.unwrap().unwrap();
        assert_eq!(conversation.state, ConversationState::ConfirmOrder);
    }

    #[tokio::test]
    async fn duplicate_mid_is_suppressed() {
        let fx = fixture(true).await;
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();
        let sends_after_first = fx.sender.sent().len();

        // Same mid redelivered; state would advance to ask_phone if the
        // duplicate were processed as a name.
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();

        let conversation = conversations::get(&fx.db, 1).await.unwrap().unwrap();
        assert_eq!(conversation.state, ConversationState::AskName);
        assert_eq!(fx.sender.sent().len(), sends_after_first);
        assert_eq!(
            inbound::count_for_conversation(&fx.db, 1).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn event_without_content_creates_conversation_but_does_not_run() {
        let fx = fixture(true).await;
        let mut event = text_event("m1", "");
        event.text = None;

        fx.dispatcher.handle(event).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 1);
        assert!(fx.sender.sent().is_empty());
        let conversation = conversations::get(&fx.db, 1).await.unwrap().unwrap();
        assert_eq!(conversation.state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn cooldown_conversation_gets_static_ack() {
        let fx = fixture(true).await;
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();

        fx.db
            .connection()
            .call(|conn| {
                conn.execute(
                    "UPDATE conversations
                     SET state = 'completed', cooldown_until = '2999-01-01T00:00:00Z'",
                    [],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        fx.dispatcher.handle(text_event("m2", "mua")).await.unwrap();

        assert_eq!(fx.sender.texts().last().unwrap(), replies::cooldown_ack());
        let conversation = conversations::get(&fx.db, 1).await.unwrap().unwrap();
        assert_eq!(conversation.state, ConversationState::Completed);
    }

    #[tokio::test]
    async fn separate_pages_get_separate_conversations() {
        let fx = fixture(true).await;
        accounts::create_account(&fx.db, 1, "page-2", "Shop 2", "tok2")
            .await
            .unwrap();

        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();
        let mut event = text_event("m2", "mua");
        event.page_id = "page-2".into();
        fx.dispatcher.handle(event).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 2);
    }

    #[tokio::test]
    async fn same_mid_on_different_conversations_processes_both() {
        let fx = fixture(true).await;
        fx.dispatcher.handle(text_event("m1", "mua")).await.unwrap();

        let mut event = text_event("m1", "mua");
        event.psid = "88".into();
        fx.dispatcher.handle(event).await.unwrap();

        assert_eq!(conversation_count(&fx.db).await, 2);
        assert_eq!(fx.sender.sent().len(), 2);
    }
}
