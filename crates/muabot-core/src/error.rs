// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified error type for the muabot workspace.
//!
//! All crates return [`MuabotError`] across public boundaries. Variants map
//! to the subsystem that produced the failure so callers can decide on a
//! disposition (log-and-drop, user-facing reply, abort) without string
//! matching.

use thiserror::Error;

/// Workspace-wide error type.
#[derive(Debug, Error)]
pub enum MuabotError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend failure (SQLite open, query, migration).
    #[error("storage error: {source}")]
    Storage {
        /// Underlying storage error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Facebook Graph API failure. `message` carries the server's
    /// `error.message` when the response body had Graph's error shape.
    #[error("graph api error: {message}")]
    Graph {
        /// Human-readable error description.
        message: String,
        /// Underlying transport error, if any.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Webhook gateway failure (bind, serve).
    #[error("gateway error: {message}")]
    Gateway {
        /// Human-readable error description.
        message: String,
        /// Underlying error, if any.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}
