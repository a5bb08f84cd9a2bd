// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation dispatch locks.
//!
//! Concurrent webhook deliveries for the same conversation must not
//! interleave their load-validate-mutate-send sequences. Locks are keyed by
//! conversation id and held only for that conversation's critical section,
//! never across unrelated conversations. In-process locking is sufficient
//! for the single-process deployment this engine targets.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Registry of per-conversation mutexes.
///
/// Entries are created on first use and kept for the process lifetime; a
/// conversation's lock is a few dozen bytes.
#[derive(Default)]
pub struct ConversationLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `conversation_id`, creating it if absent.
    pub fn for_conversation(&self, conversation_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(conversation_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
