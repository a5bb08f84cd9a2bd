// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message log with redelivery suppression.

use muabot_core::MuabotError;
use rusqlite::params;

use crate::database::Database;

/// Record an inbound message against a conversation.
///
/// Returns `true` when the row was newly inserted. A duplicate (conversation,
/// mid) pair is silently ignored and returns `false`, which is how webhook
/// redeliveries are detected. Messages without a mid are always recorded.
pub async fn record_message(
    db: &Database,
    conversation_id: i64,
    mid: Option<&str>,
    body: Option<&str>,
    payload: Option<&str>,
) -> Result<bool, MuabotError> {
    let mid = mid.map(|s| s.to_string());
    let body = body.map(|s| s.to_string());
    let payload = payload.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO inbound_messages (conversation_id, mid, body, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![conversation_id, mid, body, payload],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of logged messages for a conversation.
pub async fn count_for_conversation(
    db: &Database,
    conversation_id: i64,
) -> Result<i64, MuabotError> {
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM inbound_messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
