// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partner (customer) lookups.
//!
//! Partner creation happens inside the order placement transaction, not here,
//! so matching and creating stay atomic with the order itself.

use muabot_core::MuabotError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::Partner;

pub(crate) const PARTNER_COLUMNS: &str =
    "id, tenant_id, name, phone, email, psid, note, active, created_at";

pub(crate) fn row_to_partner(row: &rusqlite::Row<'_>) -> Result<Partner, rusqlite::Error> {
    Ok(Partner {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        psid: row.get(5)?,
        note: row.get(6)?,
        active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Find the active partner holding a normalized phone number in a tenant.
pub async fn find_active_by_phone(
    db: &Database,
    tenant_id: i64,
    phone: &str,
) -> Result<Option<Partner>, MuabotError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let partner = conn
                .query_row(
                    &format!(
                        "SELECT {PARTNER_COLUMNS} FROM partners
                         WHERE tenant_id = ?1 AND phone = ?2 AND active = 1"
                    ),
                    params![tenant_id, phone],
                    row_to_partner,
                )
                .optional()?;
            Ok(partner)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a partner by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Partner>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let partner = conn
                .query_row(
                    &format!("SELECT {PARTNER_COLUMNS} FROM partners WHERE id = ?1"),
                    params![id],
                    row_to_partner,
                )
                .optional()?;
            Ok(partner)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    async fn insert_partner(db: &Database, tenant_id: i64, name: &str, phone: &str, active: bool) -> i64 {
        let name = name.to_string();
        let phone = phone.to_string();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO partners (tenant_id, name, phone, active) VALUES (?1, ?2, ?3, ?4)",
                    params![tenant_id, name, phone, active],
                )?;
                Ok::<_, rusqlite::Error>(conn.last_insert_rowid())
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn find_active_by_phone_matches() {
        let (db, _dir) = setup_db().await;

        let id = insert_partner(&db, 1, "Nguyễn Văn An", "0912345678", true).await;
        let found = find_active_by_phone(&db, 1, "0912345678").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Nguyễn Văn An");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_active_by_phone_skips_inactive() {
        let (db, _dir) = setup_db().await;

        insert_partner(&db, 1, "Cũ", "0911111111", false).await;
        let found = find_active_by_phone(&db, 1, "0911111111").await.unwrap();
        assert!(found.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_active_by_phone_scoped_to_tenant() {
        let (db, _dir) = setup_db().await;

        insert_partner(&db, 2, "Khác", "0922222222", true).await;
        let found = find_active_by_phone(&db, 1, "0922222222").await.unwrap();
        assert!(found.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_active_phone_in_tenant_rejected() {
        let (db, _dir) = setup_db().await;

        insert_partner(&db, 1, "Một", "0933333333", true).await;
        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO partners (tenant_id, name, phone, active) VALUES (1, 'Hai', '0933333333', 1)",
                    [],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await;
        assert!(result.is_err(), "partial unique index should reject");

        // An inactive duplicate is fine.
        insert_partner(&db, 1, "Ba", "0933333333", false).await;

        db.close().await.unwrap();
    }
}
