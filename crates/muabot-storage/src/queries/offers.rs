// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog queries: products and the offers surfaced through Messenger.
//!
//! Offers are returned as a read model joined with their product, ordered by
//! (sequence, id) so the chatbot's numbered list and the quick-reply row
//! always agree.

use muabot_core::MuabotError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{Offer, Product};

const OFFER_COLUMNS: &str = "o.id, o.tenant_id, o.product_id, o.sequence, o.caption, o.active, \
     p.name, p.list_price";

fn row_to_offer(row: &rusqlite::Row<'_>) -> Result<Offer, rusqlite::Error> {
    Ok(Offer {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        product_id: row.get(2)?,
        sequence: row.get(3)?,
        caption: row.get(4)?,
        active: row.get(5)?,
        product_name: row.get(6)?,
        list_price: row.get(7)?,
    })
}

/// Create a catalog product.
pub async fn create_product(
    db: &Database,
    name: &str,
    list_price: i64,
) -> Result<Product, MuabotError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO products (name, list_price) VALUES (?1, ?2)",
                params![name, list_price],
            )?;
            let id = conn.last_insert_rowid();
            let product = conn.query_row(
                "SELECT id, name, list_price, created_at FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Product {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        list_price: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )?;
            Ok(product)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Surface a product through Messenger for a tenant.
///
/// The caption, when present, must fit a quick-reply title; the schema CHECK
/// rejects anything longer than 20 characters.
pub async fn create_offer(
    db: &Database,
    tenant_id: i64,
    product_id: i64,
    sequence: i64,
    caption: Option<&str>,
    active: bool,
) -> Result<Offer, MuabotError> {
    let caption = caption.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO offers (tenant_id, product_id, sequence, caption, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![tenant_id, product_id, sequence, caption, active],
            )?;
            let id = conn.last_insert_rowid();
            let offer = conn.query_row(
                &format!(
                    "SELECT {OFFER_COLUMNS} FROM offers o
                     JOIN products p ON p.id = o.product_id
                     WHERE o.id = ?1"
                ),
                params![id],
                row_to_offer,
            )?;
            Ok(offer)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The active catalog for a tenant, in display order.
pub async fn active_offers(db: &Database, tenant_id: i64) -> Result<Vec<Offer>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OFFER_COLUMNS} FROM offers o
                 JOIN products p ON p.id = o.product_id
                 WHERE o.tenant_id = ?1 AND o.active = 1
                 ORDER BY o.sequence ASC, o.id ASC"
            ))?;
            let offers = stmt
                .query_map(params![tenant_id], row_to_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(offers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve one active offer by id within a tenant.
///
/// Quick-reply payloads carry offer ids; an offer deactivated between list
/// and tap resolves to `None` and the caller re-shows the catalog.
pub async fn find_active(
    db: &Database,
    tenant_id: i64,
    offer_id: i64,
) -> Result<Option<Offer>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let offer = conn
                .query_row(
                    &format!(
                        "SELECT {OFFER_COLUMNS} FROM offers o
                         JOIN products p ON p.id = o.product_id
                         WHERE o.id = ?1 AND o.tenant_id = ?2 AND o.active = 1"
                    ),
                    params![offer_id, tenant_id],
                    row_to_offer,
                )
                .optional()?;
            Ok(offer)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every offer for a tenant, active or not, in display order.
pub async fn list_offers(db: &Database, tenant_id: i64) -> Result<Vec<Offer>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OFFER_COLUMNS} FROM offers o
                 JOIN products p ON p.id = o.product_id
                 WHERE o.tenant_id = ?1
                 ORDER BY o.sequence ASC, o.id ASC"
            ))?;
            let offers = stmt
                .query_map(params![tenant_id], row_to_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(offers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
