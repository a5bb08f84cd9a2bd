// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use muabot_config::model::StorageConfig;
use muabot_core::MuabotError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cloning is cheap; all clones share one background connection thread, which
/// is what serializes writes. Migrations run on open, so a `Database` is
/// always at the current schema version.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, MuabotError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(
            move |conn| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                conn.pragma_update(None, "foreign_keys", "ON")?;
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                migrations::run(conn)?;
                Ok(())
            },
        )
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(source) => MuabotError::Storage { source },
            tokio_rusqlite::Error::ConnectionClosed => {
                map_tr_err(tokio_rusqlite::Error::ConnectionClosed)
            }
            tokio_rusqlite::Error::Close(c) => map_tr_err(tokio_rusqlite::Error::Close(c)),
            e => MuabotError::Storage {
                source: e.to_string().into(),
            },
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open the database described by a [`StorageConfig`].
    pub async fn open_from_config(config: &StorageConfig) -> Result<Self, MuabotError> {
        Self::open(&config.database_path, config.wal_mode).await
    }

    /// The shared tokio-rusqlite connection. Query modules call through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL ahead of process exit.
    ///
    /// The connection itself is closed when the last clone drops.
    pub async fn close(&self) -> Result<(), MuabotError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> MuabotError {
    MuabotError::Storage {
        source: Box::new(err),
    }
}
