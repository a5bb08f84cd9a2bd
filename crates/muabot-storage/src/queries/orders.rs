// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order read queries.
//!
//! Order creation is a multi-step transaction owned by the order service;
//! this module covers the read side used by the CLI, tests, and the success
//! reply.

use muabot_core::MuabotError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{Order, OrderLine};

pub(crate) const ORDER_COLUMNS: &str = "id, tenant_id, name, partner_id, origin, ordered_at, \
     salesperson_id, total, note, created_at";

pub(crate) fn row_to_order(row: &rusqlite::Row<'_>) -> Result<Order, rusqlite::Error> {
    Ok(Order {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        partner_id: row.get(3)?,
        origin: row.get(4)?,
        ordered_at: row.get(5)?,
        salesperson_id: row.get(6)?,
        total: row.get(7)?,
        note: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Get an order header by id.
pub async fn get_order(db: &Database, id: i64) -> Result<Option<Order>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let order = conn
                .query_row(
                    &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                    params![id],
                    row_to_order,
                )
                .optional()?;
            Ok(order)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Lines of an order, in insertion order.
pub async fn lines_for_order(db: &Database, order_id: i64) -> Result<Vec<OrderLine>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, order_id, product_id, description, quantity, unit_price
                 FROM order_lines WHERE order_id = ?1 ORDER BY id ASC",
            )?;
            let lines = stmt
                .query_map(params![order_id], |row| {
                    Ok(OrderLine {
                        id: row.get(0)?,
                        order_id: row.get(1)?,
                        product_id: row.get(2)?,
                        description: row.get(3)?,
                        quantity: row.get(4)?,
                        unit_price: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of orders, for status display.
pub async fn count_orders(db: &Database) -> Result<i64, MuabotError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
