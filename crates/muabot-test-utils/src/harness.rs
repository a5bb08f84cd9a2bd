// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `ChatHarness` assembles a complete chatbot stack with a mock sender,
//! temp SQLite database, and a seeded page account plus catalog. Provides
//! `deliver_text()` / `deliver_quick_reply()` to drive the full dispatch
//! pipeline in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use muabot_chatbot::{Dispatcher, IncomingMessage};
use muabot_config::model::ChatbotConfig;
use muabot_core::{Account, Conversation, MuabotError, Offer, Psid};
use muabot_storage::queries::{accounts, conversations, offers};
use muabot_storage::Database;

use crate::mock_sender::MockSender;

/// Builder for creating test environments with configurable options.
pub struct ChatHarnessBuilder {
    chatbot_enabled: bool,
    cooldown_minutes: i64,
    lead_default_user_id: Option<i64>,
    catalog: Vec<(String, i64)>,
}

impl ChatHarnessBuilder {
    fn new() -> Self {
        Self {
            chatbot_enabled: true,
            cooldown_minutes: 30,
            lead_default_user_id: None,
            catalog: vec![
                ("Cà phê".to_string(), 25000),
                ("Trà sữa".to_string(), 30000),
                ("Bánh mì".to_string(), 20000),
            ],
        }
    }

    /// Replace the seeded catalog with the given (name, list price) pairs.
    pub fn with_catalog(mut self, items: &[(&str, i64)]) -> Self {
        self.catalog = items.iter().map(|(n, p)| (n.to_string(), *p)).collect();
        self
    }

    /// Seed no products at all.
    pub fn with_empty_catalog(mut self) -> Self {
        self.catalog.clear();
        self
    }

    /// Set the post-order cooldown window.
    pub fn with_cooldown_minutes(mut self, minutes: i64) -> Self {
        self.cooldown_minutes = minutes;
        self
    }

    /// Turn the chatbot master switch off.
    pub fn with_chatbot_disabled(mut self) -> Self {
        self.chatbot_enabled = false;
        self
    }

    /// Assign created orders to this internal salesperson id.
    pub fn with_lead_user(mut self, user_id: i64) -> Self {
        self.lead_default_user_id = Some(user_id);
        self
    }

    /// Build the test harness, creating the database and seeding the page.
    pub async fn build(self) -> Result<ChatHarness, MuabotError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MuabotError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let db = Database::open(&db_path_str, true).await?;

        let account =
            accounts::create_account(&db, 1, "page-1", "Muabot Shop", "test-token").await?;

        let mut seeded = Vec::new();
        for (i, (name, price)) in self.catalog.iter().enumerate() {
            let product = offers::create_product(&db, name, *price).await?;
            let sequence = (i as i64 + 1) * 10;
            let offer = offers::create_offer(
                &db,
                account.tenant_id,
                product.id,
                sequence,
                None,
                true,
            )
            .await?;
            seeded.push(offer);
        }

        let config = ChatbotConfig {
            enabled: self.chatbot_enabled,
            cooldown_minutes: self.cooldown_minutes,
            lead_default_user_id: self.lead_default_user_id,
        };

        let sender = Arc::new(MockSender::new());
        let dispatcher = Dispatcher::new(db.clone(), sender.clone(), config.clone());

        Ok(ChatHarness {
            db,
            sender,
            dispatcher,
            account,
            offers: seeded,
            config,
            mid_counter: AtomicU64::new(0),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock sender and temp storage.
///
/// Provides access to the database and captured sends for assertions, and
/// delivery methods that drive the full pipeline (dispatch -> state machine
/// -> order transaction) exactly as a webhook delivery would.
pub struct ChatHarness {
    /// SQLite database (temp file, cleaned up on drop).
    pub db: Database,
    /// The mock outbound sender; captured messages live here.
    pub sender: Arc<MockSender>,
    /// The dispatch pipeline under test.
    pub dispatcher: Dispatcher,
    /// The seeded page account.
    pub account: Account,
    /// The seeded catalog, in display order.
    pub offers: Vec<Offer>,
    /// Chatbot configuration the dispatcher was built with.
    pub config: ChatbotConfig,
    /// Monotonic source for unique message ids.
    mid_counter: AtomicU64,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl ChatHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> ChatHarnessBuilder {
        ChatHarnessBuilder::new()
    }

    fn next_mid(&self) -> String {
        let n = self.mid_counter.fetch_add(1, Ordering::SeqCst);
        format!("mid-{n}")
    }

    /// Deliver a text message from `psid` through the full pipeline.
    ///
    /// Each delivery carries a fresh unique mid, so redelivery suppression
    /// never interferes. Use [`ChatHarness::deliver`] to replay a mid.
    pub async fn deliver_text(&self, psid: &str, text: &str) -> Result<(), MuabotError> {
        self.dispatcher
            .handle(IncomingMessage {
                page_id: self.account.page_id.clone(),
                psid: psid.to_string(),
                mid: Some(self.next_mid()),
                text: Some(text.to_string()),
                quick_reply_payload: None,
                is_echo: false,
            })
            .await
    }

    /// Deliver a quick-reply tap from `psid`.
    pub async fn deliver_quick_reply(&self, psid: &str, payload: &str) -> Result<(), MuabotError> {
        self.dispatcher
            .handle(IncomingMessage {
                page_id: self.account.page_id.clone(),
                psid: psid.to_string(),
                mid: Some(self.next_mid()),
                text: None,
                quick_reply_payload: Some(payload.to_string()),
                is_echo: false,
            })
            .await
    }

    /// Deliver a raw event, for echoes, redeliveries and foreign pages.
    pub async fn deliver(&self, event: IncomingMessage) -> Result<(), MuabotError> {
        self.dispatcher.handle(event).await
    }

    /// The conversation row for `psid`, if the pipeline created one.
    pub async fn conversation(&self, psid: &str) -> Result<Option<Conversation>, MuabotError> {
        conversations::find_by_psid(&self.db, self.account.id, &Psid(psid.to_string())).await
    }
}
