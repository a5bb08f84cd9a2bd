// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD and state transitions.
//!
//! A conversation is keyed by (psid, account_id); `find_or_create` is the
//! only way rows come into existence, so concurrent deliveries for the same
//! user converge on one row.

use muabot_core::MuabotError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{Conversation, ConversationState, Psid};

const CONVERSATION_COLUMNS: &str = "id, account_id, tenant_id, psid, state, customer_name, \
     customer_phone, customer_email, customer_address, quantity, cooldown_until, \
     order_id, partner_id, created_at, last_message_at";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let psid: String = row.get(3)?;
    let state_raw: String = row.get(4)?;
    let state = state_raw.parse::<ConversationState>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Conversation {
        id: row.get(0)?,
        account_id: row.get(1)?,
        tenant_id: row.get(2)?,
        psid: Psid(psid),
        state,
        customer_name: row.get(5)?,
        customer_phone: row.get(6)?,
        customer_email: row.get(7)?,
        customer_address: row.get(8)?,
        quantity: row.get(9)?,
        cooldown_until: row.get(10)?,
        order_id: row.get(11)?,
        partner_id: row.get(12)?,
        created_at: row.get(13)?,
        last_message_at: row.get(14)?,
    })
}

/// Find the conversation for (account, psid), creating an idle one if absent.
///
/// INSERT OR IGNORE makes this safe against concurrent deliveries: the
/// unique index on (psid, account_id) guarantees a single row.
pub async fn find_or_create(
    db: &Database,
    account_id: i64,
    tenant_id: i64,
    psid: &Psid,
) -> Result<Conversation, MuabotError> {
    let psid = psid.as_str().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO conversations (account_id, tenant_id, psid)
                 VALUES (?1, ?2, ?3)",
                params![account_id, tenant_id, psid],
            )?;
            let conversation = conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE account_id = ?1 AND psid = ?2"
                ),
                params![account_id, psid],
                row_to_conversation,
            )?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Conversation>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let conversation = conn
                .query_row(
                    &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                    params![id],
                    row_to_conversation,
                )
                .optional()?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up the conversation for (account, psid) without creating one.
pub async fn find_by_psid(
    db: &Database,
    account_id: i64,
    psid: &Psid,
) -> Result<Option<Conversation>, MuabotError> {
    let psid = psid.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let conversation = conn
                .query_row(
                    &format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE account_id = ?1 AND psid = ?2"
                    ),
                    params![account_id, psid],
                    row_to_conversation,
                )
                .optional()?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a conversation to a new state.
pub async fn set_state(
    db: &Database,
    id: i64,
    state: ConversationState,
) -> Result<(), MuabotError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET state = ?1 WHERE id = ?2",
                params![state, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store the normalized customer name.
pub async fn set_customer_name(db: &Database, id: i64, name: &str) -> Result<(), MuabotError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET customer_name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store the normalized customer phone.
pub async fn set_customer_phone(db: &Database, id: i64, phone: &str) -> Result<(), MuabotError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET customer_phone = ?1 WHERE id = ?2",
                params![phone, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp last_message_at with the current time.
pub async fn touch_last_message(db: &Database, id: i64) -> Result<(), MuabotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET last_message_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add an offer to the conversation's selection set. Re-selecting the same
/// offer is a no-op.
pub async fn add_selected_offer(
    db: &Database,
    conversation_id: i64,
    offer_id: i64,
) -> Result<(), MuabotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO conversation_offers (conversation_id, offer_id)
                 VALUES (?1, ?2)",
                params![conversation_id, offer_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Drop every selected offer for a conversation.
pub async fn clear_selected_offers(db: &Database, conversation_id: i64) -> Result<(), MuabotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM conversation_offers WHERE conversation_id = ?1",
                params![conversation_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ids of the offers currently selected in a conversation.
pub async fn selected_offer_ids(
    db: &Database,
    conversation_id: i64,
) -> Result<Vec<i64>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT offer_id FROM conversation_offers
                 WHERE conversation_id = ?1 ORDER BY offer_id ASC",
            )?;
            let ids = stmt
                .query_map(params![conversation_id], |row| row.get(0))?
                .collect::<Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Put a conversation back at the start of the flow.
///
/// Clears the selection set and resets quantity; the captured name, phone
/// and order backreferences stay, since the next run re-collects them.
pub async fn reset_to_idle(db: &Database, id: i64) -> Result<(), MuabotError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE conversations SET state = 'idle', quantity = 1 WHERE id = ?1",
                params![id],
            )?;
            tx.execute(
                "DELETE FROM conversation_offers WHERE conversation_id = ?1",
                params![id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of conversations, for status display.
pub async fn count_conversations(db: &Database) -> Result<i64, MuabotError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
