// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transactional order placement.
//!
//! Everything in [`place_order`] happens inside one SQLite transaction:
//! partner lookup-or-create, order header, lines, audit note, and the
//! conversation's move to `completed`. The conversation state is re-read
//! inside the transaction and placement aborts unless it is still
//! `confirm_order`, which is what makes duplicate confirmation deliveries
//! collapse into a single order.

use chrono::{Duration, Utc};
use muabot_config::model::ChatbotConfig;
use muabot_storage::database::{map_tr_err, Database};
use muabot_storage::models::{Order, OrderLine};
use rusqlite::{params, OptionalExtension, Transaction};
use tracing::{debug, info};

use crate::error::{OrderError, ValidationFailure};

/// A successfully committed order, plus what the caller needs for the
/// success reply.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub partner_id: i64,
    /// End of the post-order cooldown window, RFC3339.
    pub cooldown_until: String,
}

/// Place an order for a conversation currently awaiting confirmation.
///
/// On `Ok`, the order and all side effects are committed. On any `Err`, no
/// row was touched. The post-commit confirmation send is the caller's job;
/// a send failure must not undo the order.
pub async fn place_order(
    db: &Database,
    config: &ChatbotConfig,
    conversation_id: i64,
) -> Result<PlacedOrder, OrderError> {
    let salesperson_id = config.lead_default_user_id;
    let cooldown_minutes = config.cooldown_minutes;
    let cooldown_until = (Utc::now() + Duration::minutes(cooldown_minutes)).to_rfc3339();

    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let outcome = run_order_transaction(
                &tx,
                conversation_id,
                salesperson_id,
                &cooldown_until,
            )?;
            match outcome {
                Ok(placed) => {
                    tx.commit()?;
                    Ok(Ok(placed))
                }
                Err(domain) => {
                    tx.rollback()?;
                    Ok(Err(domain))
                }
            }
        })
        .await
        .map_err(|e| OrderError::Storage(map_tr_err(e)))?;

    match &outcome {
        Ok(placed) => info!(
            order = %placed.order.name,
            total = placed.order.total,
            conversation_id,
            "order placed"
        ),
        Err(err) => debug!(conversation_id, %err, "order placement aborted"),
    }
    outcome
}

/// The conversation fields the transaction needs.
struct ConversationSnapshot {
    tenant_id: i64,
    psid: String,
    state: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    quantity: i64,
}

/// A selected offer joined with its product, priced at read time.
struct SelectedOffer {
    product_id: i64,
    product_name: String,
    list_price: i64,
}

/// Body of the order transaction. SQL failures propagate as
/// `rusqlite::Error`; domain outcomes travel in the inner `Result` so the
/// caller can roll back without losing them.
fn run_order_transaction(
    tx: &Transaction<'_>,
    conversation_id: i64,
    salesperson_id: Option<i64>,
    cooldown_until: &str,
) -> Result<Result<PlacedOrder, OrderError>, rusqlite::Error> {
    // Re-read under the transaction; a concurrent duplicate confirmation
    // sees `completed` here and aborts.
    let snapshot = tx
        .query_row(
            "SELECT tenant_id, psid, state, customer_name, customer_phone, quantity
             FROM conversations WHERE id = ?1",
            params![conversation_id],
            |row| {
                Ok(ConversationSnapshot {
                    tenant_id: row.get(0)?,
                    psid: row.get(1)?,
                    state: row.get(2)?,
                    customer_name: row.get(3)?,
                    customer_phone: row.get(4)?,
                    quantity: row.get(5)?,
                })
            },
        )
        .optional()?;

    let Some(snapshot) = snapshot else {
        return Ok(Err(OrderError::NotAwaitingConfirmation));
    };
    if snapshot.state != "confirm_order" {
        return Ok(Err(OrderError::NotAwaitingConfirmation));
    }

    let Some(name) = snapshot.customer_name.filter(|n| !n.is_empty()) else {
        return Ok(Err(OrderError::Validation(ValidationFailure::MissingName)));
    };
    let Some(phone) = snapshot.customer_phone.filter(|p| !p.is_empty()) else {
        return Ok(Err(OrderError::Validation(ValidationFailure::MissingPhone)));
    };

    let mut stmt = tx.prepare(
        "SELECT o.product_id, p.name, p.list_price
         FROM conversation_offers co
         JOIN offers o ON o.id = co.offer_id
         JOIN products p ON p.id = o.product_id
         WHERE co.conversation_id = ?1
         ORDER BY o.sequence ASC, o.id ASC",
    )?;
    let selected = stmt
        .query_map(params![conversation_id], |row| {
            Ok(SelectedOffer {
                product_id: row.get(0)?,
                product_name: row.get(1)?,
                list_price: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    if selected.is_empty() {
        return Ok(Err(OrderError::Validation(ValidationFailure::EmptySelection)));
    }

    let partner_id = resolve_partner(tx, snapshot.tenant_id, &name, &phone, &snapshot.psid)?;

    let origin = format!("Facebook Messenger - {}", snapshot.psid);
    let note = format!(
        "Facebook Messenger order - {} / {} - PSID {}",
        name, phone, snapshot.psid
    );
    tx.execute(
        "INSERT INTO orders (tenant_id, partner_id, origin, salesperson_id, note)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![snapshot.tenant_id, partner_id, origin, salesperson_id, note],
    )?;
    let order_id = tx.last_insert_rowid();
    // Human order code derives from the row id, e.g. FBM00042.
    tx.execute(
        "UPDATE orders SET name = 'FBM' || printf('%05d', id) WHERE id = ?1",
        params![order_id],
    )?;

    let mut lines = Vec::with_capacity(selected.len());
    let mut total: i64 = 0;
    for offer in &selected {
        tx.execute(
            "INSERT INTO order_lines (order_id, product_id, description, quantity, unit_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                order_id,
                offer.product_id,
                offer.product_name,
                snapshot.quantity,
                offer.list_price
            ],
        )?;
        let line_id = tx.last_insert_rowid();
        total += snapshot.quantity * offer.list_price;
        lines.push(OrderLine {
            id: line_id,
            order_id,
            product_id: Some(offer.product_id),
            description: offer.product_name.clone(),
            quantity: snapshot.quantity,
            unit_price: offer.list_price,
        });
    }
    tx.execute(
        "UPDATE orders SET total = ?1 WHERE id = ?2",
        params![total, order_id],
    )?;

    tx.execute(
        "UPDATE conversations
         SET state = 'completed', cooldown_until = ?1, order_id = ?2, partner_id = ?3
         WHERE id = ?4",
        params![cooldown_until, order_id, partner_id, conversation_id],
    )?;

    let (order_name, ordered_at, created_at): (String, String, String) = tx.query_row(
        "SELECT name, ordered_at, created_at FROM orders WHERE id = ?1",
        params![order_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(Ok(PlacedOrder {
        order: Order {
            id: order_id,
            tenant_id: snapshot.tenant_id,
            name: order_name,
            partner_id,
            origin,
            ordered_at,
            salesperson_id,
            total,
            note: Some(note),
            created_at,
        },
        lines,
        partner_id,
        cooldown_until: cooldown_until.to_string(),
    }))
}

/// Find the active partner for (tenant, phone) or create one.
///
/// Creation can race another writer on the partial unique index; on a
/// constraint violation the lookup runs once more and reuses the winner.
fn resolve_partner(
    tx: &Transaction<'_>,
    tenant_id: i64,
    name: &str,
    phone: &str,
    psid: &str,
) -> Result<i64, rusqlite::Error> {
    let lookup = |tx: &Transaction<'_>| -> Result<Option<i64>, rusqlite::Error> {
        tx.query_row(
            "SELECT id FROM partners WHERE tenant_id = ?1 AND phone = ?2 AND active = 1",
            params![tenant_id, phone],
            |row| row.get(0),
        )
        .optional()
    };

    if let Some(id) = lookup(tx)? {
        return Ok(id);
    }

    let created = tx.execute(
        "INSERT INTO partners (tenant_id, name, phone, psid, note)
         VALUES (?1, ?2, ?3, ?4, 'Created from Facebook Messenger')",
        params![tenant_id, name, phone, psid],
    );
    match created {
        Ok(_) => Ok(tx.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            match lookup(tx)? {
                Some(id) => Ok(id),
                None => Err(rusqlite::Error::QueryReturnedNoRows),
            }
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muabot_storage::models::{ConversationState, Psid};
    use muabot_storage::queries::{accounts, conversations, offers, orders, partners};
    use tempfile::tempdir;

    fn chatbot_config(cooldown_minutes: i64, salesperson: Option<i64>) -> ChatbotConfig {
        ChatbotConfig {
            enabled: true,
            cooldown_minutes,
            lead_default_user_id: salesperson,
        }
    }

    struct OrderFixture {
        db: Database,
        conversation_id: i64,
        offer_ids: Vec<i64>,
        _dir: tempfile::TempDir,
    }

    /// A conversation in `confirm_order` with name, phone, and two selected
    /// offers (25 000 + 30 000 VND).
    async fn fixture_ready_to_confirm() -> OrderFixture {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("orders.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let account = accounts::create_account(&db, 1, "page-1", "Shop", "tok")
            .await
            .unwrap();
        let conv = conversations::find_or_create(&db, account.id, 1, &Psid("2408".into()))
            .await
            .unwrap();

        let p1 = offers::create_product(&db, "Cà phê", 25000).await.unwrap();
        let p2 = offers::create_product(&db, "Trà sữa", 30000).await.unwrap();
        let o1 = offers::create_offer(&db, 1, p1.id, 10, None, true).await.unwrap();
        let o2 = offers::create_offer(&db, 1, p2.id, 20, None, true).await.unwrap();

        conversations::set_customer_name(&db, conv.id, "Alice").await.unwrap();
        conversations::set_customer_phone(&db, conv.id, "0912345678").await.unwrap();
        conversations::add_selected_offer(&db, conv.id, o1.id).await.unwrap();
        conversations::add_selected_offer(&db, conv.id, o2.id).await.unwrap();
        conversations::set_state(&db, conv.id, ConversationState::ConfirmOrder)
            .await
            .unwrap();

        OrderFixture {
            db,
            conversation_id: conv.id,
            offer_ids: vec![o1.id, o2.id],
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn happy_path_commits_order_lines_and_completion() {
        let fx = fixture_ready_to_confirm().await;

        let placed = place_order(&fx.db, &chatbot_config(5, Some(7)), fx.conversation_id)
            .await
            .unwrap();

        assert_eq!(placed.order.name, format!("FBM{:05}", placed.order.id));
        assert_eq!(placed.order.total, 55000);
        assert_eq!(placed.order.origin, "Facebook Messenger - 2408");
        assert_eq!(placed.order.salesperson_id, Some(7));
        assert_eq!(placed.lines.len(), 2);
        assert_eq!(placed.lines[0].description, "Cà phê");
        assert_eq!(placed.lines[0].unit_price, 25000);
        assert_eq!(placed.lines[0].quantity, 1);
        assert_eq!(placed.lines[1].description, "Trà sữa");

        // The committed rows match what was returned.
        let stored = orders::get_order(&fx.db, placed.order.id).await.unwrap().unwrap();
        assert_eq!(stored.total, 55000);
        assert_eq!(stored.name, placed.order.name);
        let stored_lines = orders::lines_for_order(&fx.db, placed.order.id).await.unwrap();
        assert_eq!(stored_lines.len(), 2);

        // Conversation moved to completed with cooldown and backrefs.
        let conv = conversations::get(&fx.db, fx.conversation_id).await.unwrap().unwrap();
        assert_eq!(conv.state, ConversationState::Completed);
        assert!(conv.cooldown_active());
        assert_eq!(conv.order_id, Some(placed.order.id));
        assert_eq!(conv.partner_id, Some(placed.partner_id));

        // Partner created with PSID backreference.
        let partner = partners::get(&fx.db, placed.partner_id).await.unwrap().unwrap();
        assert_eq!(partner.name, "Alice");
        assert_eq!(partner.phone, "0912345678");
        assert_eq!(partner.psid.as_deref(), Some("2408"));

        // Audit note references name, phone, and PSID.
        let note = placed.order.note.unwrap();
        assert!(note.contains("Alice"));
        assert!(note.contains("0912345678"));
        assert!(note.contains("2408"));

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn existing_active_partner_is_reused() {
        let fx = fixture_ready_to_confirm().await;

        // Same phone, pre-existing partner under a different name.
        fx.db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO partners (tenant_id, name, phone) VALUES (1, 'Cũ', '0912345678')",
                    [],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let placed = place_order(&fx.db, &chatbot_config(5, None), fx.conversation_id)
            .await
            .unwrap();

        let partner = partners::get(&fx.db, placed.partner_id).await.unwrap().unwrap();
        assert_eq!(partner.name, "Cũ", "existing partner name must not be overwritten");

        let partner_count: i64 = fx
            .db
            .connection()
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM partners", [], |row| row.get(0))?;
                Ok::<i64, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(partner_count, 1);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_phone_fails_validation_and_keeps_state() {
        let fx = fixture_ready_to_confirm().await;
        fx.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE conversations SET customer_phone = NULL WHERE id = ?1",
                    params![fx.conversation_id],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let err = place_order(&fx.db, &chatbot_config(5, None), fx.conversation_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Validation(ValidationFailure::MissingPhone)
        ));

        let conv = conversations::get(&fx.db, fx.conversation_id).await.unwrap().unwrap();
        assert_eq!(conv.state, ConversationState::ConfirmOrder);
        assert_eq!(orders::count_orders(&fx.db).await.unwrap(), 0);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_selection_fails_validation() {
        let fx = fixture_ready_to_confirm().await;
        conversations::clear_selected_offers(&fx.db, fx.conversation_id)
            .await
            .unwrap();

        let err = place_order(&fx.db, &chatbot_config(5, None), fx.conversation_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Validation(ValidationFailure::EmptySelection)
        ));
        assert_eq!(orders::count_orders(&fx.db).await.unwrap(), 0);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_state_aborts_without_order() {
        let fx = fixture_ready_to_confirm().await;
        conversations::set_state(&fx.db, fx.conversation_id, ConversationState::ShowProducts)
            .await
            .unwrap();

        let err = place_order(&fx.db, &chatbot_config(5, None), fx.conversation_id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotAwaitingConfirmation));
        assert_eq!(orders::count_orders(&fx.db).await.unwrap(), 0);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_confirmation_creates_one_order() {
        let fx = fixture_ready_to_confirm().await;
        let config = chatbot_config(5, None);

        let first = place_order(&fx.db, &config, fx.conversation_id).await;
        assert!(first.is_ok());

        // Replayed confirmation: the state re-read sees `completed`.
        let second = place_order(&fx.db, &config, fx.conversation_id).await;
        assert!(matches!(
            second.unwrap_err(),
            OrderError::NotAwaitingConfirmation
        ));

        assert_eq!(orders::count_orders(&fx.db).await.unwrap(), 1);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn lines_priced_at_current_offer_price() {
        let fx = fixture_ready_to_confirm().await;

        // Price change after selection but before confirmation.
        let offer_id = fx.offer_ids[0];
        fx.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE products SET list_price = 99000
                     WHERE id = (SELECT product_id FROM offers WHERE id = ?1)",
                    params![offer_id],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let placed = place_order(&fx.db, &chatbot_config(5, None), fx.conversation_id)
            .await
            .unwrap();
        assert_eq!(placed.lines[0].unit_price, 99000);
        assert_eq!(placed.order.total, 99000 + 30000);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cooldown_window_uses_configured_minutes() {
        let fx = fixture_ready_to_confirm().await;

        let placed = place_order(&fx.db, &chatbot_config(30, None), fx.conversation_id)
            .await
            .unwrap();

        let until = chrono::DateTime::parse_from_rfc3339(&placed.cooldown_until).unwrap();
        let delta = until.signed_duration_since(Utc::now());
        assert!(delta > Duration::minutes(29), "got {delta}");
        assert!(delta <= Duration::minutes(30), "got {delta}");

        fx.db.close().await.unwrap();
    }
}
