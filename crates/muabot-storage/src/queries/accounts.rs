// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Page account CRUD operations.

use muabot_core::MuabotError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Account, AccountStatus};

const ACCOUNT_COLUMNS: &str =
    "id, tenant_id, page_id, name, access_token, platform, status, active, created_at";

fn row_to_account(row: &rusqlite::Row<'_>) -> Result<Account, rusqlite::Error> {
    let status_raw: String = row.get(6)?;
    let status = status_raw.parse::<AccountStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Account {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        page_id: row.get(2)?,
        name: row.get(3)?,
        access_token: row.get(4)?,
        platform: row.get(5)?,
        status,
        active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Create a new page account in `draft` status. Returns the stored row.
pub async fn create_account(
    db: &Database,
    tenant_id: i64,
    page_id: &str,
    name: &str,
    access_token: &str,
) -> Result<Account, MuabotError> {
    let page_id = page_id.to_string();
    let name = name.to_string();
    let access_token = access_token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO accounts (tenant_id, page_id, name, access_token)
                 VALUES (?1, ?2, ?3, ?4)",
                params![tenant_id, page_id, name, access_token],
            )?;
            let id = conn.last_insert_rowid();
            let account = conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                params![id],
                row_to_account,
            )?;
            Ok(account)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the active account bound to a Facebook page id.
///
/// Inactive accounts are invisible here on purpose: deliveries for pages
/// that were disconnected must be dropped, not processed.
pub async fn find_by_page_id(db: &Database, page_id: &str) -> Result<Option<Account>, MuabotError> {
    let page_id = page_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE page_id = ?1 AND active = 1
                     ORDER BY id ASC LIMIT 1"
                ),
                params![page_id],
                row_to_account,
            );
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an account by id.
pub async fn get_account(db: &Database, id: i64) -> Result<Option<Account>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                params![id],
                row_to_account,
            );
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all accounts, newest first.
pub async fn list_accounts(db: &Database) -> Result<Vec<Account>, MuabotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id DESC"
            ))?;
            let rows = stmt.query_map([], row_to_account)?;
            let mut accounts = Vec::new();
            for row in rows {
                accounts.push(row?);
            }
            Ok(accounts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record the result of a connection test.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: AccountStatus,
) -> Result<(), MuabotError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE accounts SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
